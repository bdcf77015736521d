//! Binary lane vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;

use relaychat_core::protocol::frame::{decode_frame, encode_frame};

use vector_loader::load_frame_vector;

#[test]
fn frame_vectors() {
    let files = [
        "frame_upload.json",
        "frame_file_data_b64.json",
        "frame_no_arg.json",
        "frame_bad_version.json",
        "frame_too_short.json",
        "frame_truncated_command.json",
        "frame_truncated_arg.json",
    ];

    for f in files {
        let v = load_frame_vector(f);
        let raw = v.wire.bytes();
        let res = decode_frame(Bytes::from(raw.clone()));

        if let Some(code) = v.rejected_with {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), code, "vector={}", v.name);
            continue;
        }

        let env = res.expect("expected ok frame");
        let ex = v.envelope.expect("vector needs envelope or rejected_with");

        assert_eq!(env.command, ex.command, "vector={}", v.name);
        assert_eq!(env.arg, ex.arg, "vector={}", v.name);
        assert_eq!(env.bytes().map(|b| b.len()), Some(ex.payload_len), "vector={}", v.name);

        // decoding is canonical: re-encoding yields the same bytes
        assert_eq!(encode_frame(&env).unwrap().to_vec(), raw, "vector={}", v.name);
    }
}

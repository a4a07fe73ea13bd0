#![no_main]

use jwks_service::crypto::{self, Claims};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stored key bytes are untrusted once they leave the process; decoding
    // and signing must fail with an error, never panic.
    if let Ok(key) = crypto::decode_private_key(data) {
        let _ = crypto::public_key_components(&key);
    }

    let _ = crypto::sign_jwt(&Claims { exp: 0, iat: 0 }, data, "1");
});

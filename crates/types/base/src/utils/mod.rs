mod hash;
pub use hash::keccak256;

/// Serde helpers to carry raw bytes as base64 strings in JSON.
pub mod base64 {
    use base64::prelude::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Proof, PublicOutput, B256, U256};

    #[test]
    fn proof_bytes_are_base64_in_json() {
        let proof = Proof {
            vk_digest: B256::ZERO,
            public_outputs: vec![PublicOutput {
                bits: 248,
                value: U256::from(30000u64),
            }],
            bytes: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["bytes"], "3q2+7w==");

        let decoded: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, proof);
    }
}

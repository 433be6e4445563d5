//! Golden test vectors for deterministic verification.
//!
//! These pin the address derivation, the canonical header encoding and the
//! Ed25519 signatures over it. A mismatch means the signed bytes changed.

use deedkit_core::{address_for, Batch, EnvelopeBuilder, Identity, Nonce, Sha512Hash, Transaction};

/// A resource name and the address it must map to.
#[derive(Debug, Clone)]
pub struct AddressVector {
    pub resource_name: &'static str,
    pub expected_address: &'static str,
}

/// Address vectors.
pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            resource_name: "house1",
            expected_address: "e8fc6a63ecabc5eabca65c623afb0c2c00d9adbddf1eeee233edcda62e2934ee8d4f14",
        },
        AddressVector {
            resource_name: "barn",
            expected_address: "e8fc6aa4fa1562067f2d9d334b6e5c00cb400422bc25c0891fb5cd87cd483475ebfee9",
        },
        AddressVector {
            resource_name: "",
            expected_address: "e8fc6acf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce",
        },
        AddressVector {
            resource_name: "a,b",
            expected_address: "e8fc6a3d956f522663a6b328e451e370c26f5b525a675fc81b6b99657ec06387a4771c",
        },
        AddressVector {
            resource_name: "日本",
            expected_address: "e8fc6a7e9e0c58d2ffb712309af51176e5931aed8e22f74baa5da0457e3089d7684cc0",
        },
    ]
}

/// A golden transaction vector: fixed seed, payload fields and nonce.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    pub resource_name: &'static str,
    pub action: &'static str,
    pub owner: &'static str,
    pub nonce: [u8; 16],
    pub expected_public_key: &'static str,
    pub expected_payload_sha512: &'static str,
    /// Transaction header signature (hex).
    pub expected_signature: &'static str,
    /// Signature of a batch wrapping only this transaction (hex).
    pub expected_batch_id: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "create house1 for alice",
            seed: [0x42; 32],
            resource_name: "house1",
            action: "create",
            owner: "alice",
            nonce: [0x09; 16],
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_payload_sha512: "82fd88b8ac9ed7402ee0e52491fd89355ba85774e575366f44e6de92446a8e1d2474e4afba2dcc47e22c5a6f88aa080437de4967eb3cabf7dc363c55043980dc",
            expected_signature: "57c21478b32be5d29799d1daf95eaf298f3aa893997b4209d73626a95f595faec45dad2431a5551b6b738e660590c0364df95258ff61460057f0b8f4c6070507",
            expected_batch_id: "8716012a1ee5162903dc429baf9b916eee8726a54c2f0ab99efac7c12255703f529c9e3d93ac1f4c81a99181af066cde73e34ff48d5bf16f43affa4108f95306",
        },
        GoldenVector {
            name: "transfer house1 to bob",
            seed: [0x42; 32],
            resource_name: "house1",
            action: "transfer",
            owner: "bob",
            nonce: [0x0a; 16],
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_payload_sha512: "79e8c5ec84741f721e06a2db56ac81b8c39cbbe04795d2c4925d1b05470a594fcdbfab01677e426129fa1f03ea96a1d9305dc71d019fd8eae1469fe775b5aaf9",
            expected_signature: "3f13cf2a18720f4e7b05761a4827dd13be9ffdfeae5bb490d8ab99aadbe1e85099d045e630e5b3caaf6cd61d8f07f4f2a69e5cf052086285af7f229b98969d0a",
            expected_batch_id: "4d09cffbbdcd2605baee5414fb467a389276a3d19a285e4851685deb7771b8289a235225e357332c1c0b490f82c71f1d06bd8265d149a73791dcab32e3d4a404",
        },
        GoldenVector {
            name: "delete barn with empty owner",
            seed: [0x00; 32],
            resource_name: "barn",
            action: "delete",
            owner: "",
            nonce: [0x00; 16],
            expected_public_key: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_payload_sha512: "99b4f5275f745bdc722af5e2ed654aabbb50cd483d629a5e128987841c3635036653b3ce9e64f7f72a4c279984e636745f7ff5c51cb755cffdcf6bdc41eec1b4",
            expected_signature: "e8917129cf7f8ed288aec852df271e4673dccaec14cb120e6fd7024448d4bf415ae22dc81273b9337119a3b46419894875e80fb84238c18b39a0b52de572440f",
            expected_batch_id: "7f7828d084901982d6df7a37614b1e6c9eaade8f8c014b00ebde4819d0792ff9d8b14e6e306cc8ea85366b626c8ae4fae0cd918354f2d3b0e31ab09805921a0f",
        },
    ]
}

/// Build the transaction a vector describes.
pub fn generate_transaction_from_vector(vector: &GoldenVector) -> Transaction {
    let identity = Identity::from_seed(&vector.seed);
    EnvelopeBuilder::new().build_transaction_with_nonce(
        &identity,
        vector.resource_name,
        vector.action,
        vector.owner,
        Nonce::from_bytes(vector.nonce),
    )
}

/// Build a batch wrapping only the vector's transaction.
pub fn generate_batch_from_vector(vector: &GoldenVector) -> Batch {
    let identity = Identity::from_seed(&vector.seed);
    EnvelopeBuilder::new()
        .build_batch(vec![generate_transaction_from_vector(vector)], &identity)
        .expect("one transaction is never an empty batch")
}

/// Check every vector; returns `(name, matches, batch id hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let batch = generate_batch_from_vector(v);
            let tx = &batch.transactions()[0];
            let batch_id = batch.id().to_hex();

            let matches = tx.header().signer_public_key.to_hex() == v.expected_public_key
                && Sha512Hash::hash(tx.payload()).to_hex() == v.expected_payload_sha512
                && tx.signature().to_hex() == v.expected_signature
                && batch_id == v.expected_batch_id
                && tx.address() == Some(&address_for(v.resource_name));

            (v.name.to_string(), matches, batch_id)
        })
        .collect()
}

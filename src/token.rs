use std::future::Future;

use alloy::{
    hex,
    primitives::{keccak256, Address, Signature, B256},
    signers::Signer,
    sol_types::SolValue,
};

use crate::constants::SALT_LENGTH;

/// Produces a personal-sign signature over a 32-byte digest.
pub trait DigestSigner {
    fn sign_digest(&self, digest: B256) -> impl Future<Output = eyre::Result<Signature>> + Send;
}

impl<S> DigestSigner for S
where
    S: Signer + Sync,
{
    fn sign_digest(&self, digest: B256) -> impl Future<Output = eyre::Result<Signature>> + Send {
        // sign_message applies the "\x19Ethereum Signed Message:\n32" prefix
        async move { Ok(self.sign_message(digest.as_slice()).await?) }
    }
}

pub fn generate_salt() -> String {
    let bytes: [u8; SALT_LENGTH] = rand::random();
    hex::encode(bytes)
}

/// ABI parameter encoding of `(string salt, address contract, address wallet)`.
pub fn encode_token_message(salt: &str, contract_address: Address, wallet_address: Address) -> Vec<u8> {
    (salt.to_string(), contract_address, wallet_address).abi_encode_params()
}

pub fn token_digest(salt: &str, contract_address: Address, wallet_address: Address) -> B256 {
    keccak256(encode_token_message(salt, contract_address, wallet_address))
}

/// `0x || r || s || v` with `v` in {27, 28}.
pub fn format_signature(signature: &Signature) -> String {
    let mut bytes = signature.as_bytes();
    bytes[64] = 27 + signature.v().y_parity() as u8;
    hex::encode_prefixed(bytes)
}

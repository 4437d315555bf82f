use std::time::Duration;

use alloy::primitives::Address;

use crate::{
    config::RunConfig,
    constants::DEFAULT_SIGN_TIMEOUT_SECS,
    errors::BatchError,
    output::{TokenBook, TokenRecord},
    token::{format_signature, generate_salt, token_digest, DigestSigner},
    wallets::WalletEntry,
};

pub struct TokenBatchGenerator<'a, S> {
    contract_address: Address,
    signer: &'a S,
    sign_timeout: Duration,
}

impl<'a, S: DigestSigner> TokenBatchGenerator<'a, S> {
    pub fn new(contract_address: Address, signer: &'a S) -> Self {
        Self {
            contract_address,
            signer,
            sign_timeout: Duration::from_secs(DEFAULT_SIGN_TIMEOUT_SECS),
        }
    }

    pub fn with_sign_timeout(mut self, sign_timeout: Duration) -> Self {
        self.sign_timeout = sign_timeout;
        self
    }

    pub async fn derive_token(&self, wallet_address: Address) -> eyre::Result<TokenRecord> {
        let salt = generate_salt();
        let digest = token_digest(&salt, self.contract_address, wallet_address);

        let signature = tokio::time::timeout(self.sign_timeout, self.signer.sign_digest(digest))
            .await
            .map_err(|_| eyre::eyre!("signer did not respond within {:?}", self.sign_timeout))??;

        Ok(TokenRecord {
            salt,
            token: format_signature(&signature),
        })
    }

    /// Signs every wallet in order. The first signing failure aborts the run.
    pub async fn run_batch(&self, wallets: &[WalletEntry]) -> Result<TokenBook, BatchError> {
        let total = wallets.len();
        let mut book = TokenBook::default();

        for (i, wallet) in wallets.iter().enumerate() {
            let record = match self.derive_token(wallet.address).await {
                Ok(record) => record,
                Err(reason) => {
                    tracing::error!("[{}/{total}] Signing failed for {}: {reason:#}", i + 1, wallet.raw);
                    return Err(BatchError::Signing {
                        wallet: wallet.raw.clone(),
                        partial: book,
                        reason,
                    });
                }
            };

            tracing::info!("====== Signature [{}/{total}] ======", i + 1);
            tracing::info!("Wallet address: {}", wallet.raw);
            tracing::info!("Salt: {}", record.salt);
            tracing::info!("Token: {}", record.token);

            if book.insert(wallet.key(), record).is_some() {
                tracing::warn!("Duplicate wallet {}, keeping the latest signature", wallet.raw);
            }
        }

        Ok(book)
    }
}

impl<'a> TokenBatchGenerator<'a, alloy::signers::local::PrivateKeySigner> {
    pub fn from_config(config: &'a RunConfig) -> Self {
        Self::new(config.contract_address, &config.signer).with_sign_timeout(config.sign_timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::{future::Future, str::FromStr, sync::Mutex};

    use alloy::{
        primitives::{address, Signature, B256},
        signers::local::PrivateKeySigner,
    };

    use super::*;

    const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_CONTRACT: Address = address!("1111111111111111111111111111111111111111");

    fn test_signer() -> PrivateKeySigner {
        PrivateKeySigner::from_str(TEST_PRIVATE_KEY).unwrap()
    }

    fn wallet(raw: &str) -> WalletEntry {
        WalletEntry::parse(raw).unwrap()
    }

    /// Signs with a real key and remembers every digest it saw.
    struct RecordingSigner {
        inner: PrivateKeySigner,
        digests: Mutex<Vec<B256>>,
    }

    impl DigestSigner for RecordingSigner {
        fn sign_digest(&self, digest: B256) -> impl Future<Output = eyre::Result<Signature>> + Send {
            self.digests.lock().unwrap().push(digest);
            self.inner.sign_digest(digest)
        }
    }

    /// Fails on the n-th call (zero based).
    struct FailingSigner {
        inner: PrivateKeySigner,
        fail_at: usize,
        calls: Mutex<usize>,
    }

    impl DigestSigner for FailingSigner {
        fn sign_digest(&self, digest: B256) -> impl Future<Output = eyre::Result<Signature>> + Send {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls - 1
            };
            let fail = call == self.fail_at;
            async move {
                if fail {
                    eyre::bail!("backend unavailable");
                }
                self.inner.sign_digest(digest).await
            }
        }
    }

    struct HangingSigner;

    impl DigestSigner for HangingSigner {
        fn sign_digest(&self, _digest: B256) -> impl Future<Output = eyre::Result<Signature>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn derive_token_output_shape() {
        let signer = test_signer();
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallet = address!("abcdabcdabcdabcdabcdabcdabcdabcdabcd1234");

        let record = generator.derive_token(wallet).await.unwrap();

        assert_eq!(record.salt.len(), 32);
        assert!(record.salt.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert_eq!(record.token.len(), 132);
        assert!(record.token.starts_with("0x"));
        assert!(record.token[2..].chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[tokio::test]
    async fn derive_token_is_not_deterministic() {
        let signer = test_signer();
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallet = address!("abcdabcdabcdabcdabcdabcdabcdabcdabcd1234");

        let first = generator.derive_token(wallet).await.unwrap();
        let second = generator.derive_token(wallet).await.unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn token_recovers_to_signer() {
        let signer = test_signer();
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallet = address!("abcdabcdabcdabcdabcdabcdabcdabcdabcd1234");

        let record = generator.derive_token(wallet).await.unwrap();

        let signature = Signature::from_str(&record.token).unwrap();
        let digest = token_digest(&record.salt, TEST_CONTRACT, wallet);
        assert_eq!(signature.recover_address_from_msg(digest).unwrap(), signer.address());
    }

    #[tokio::test]
    async fn duplicate_wallets_keep_last_record() {
        let signer = RecordingSigner {
            inner: test_signer(),
            digests: Mutex::new(Vec::new()),
        };
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallets = [
            wallet("0x1b297a4fd9212e8f179c0dd34330745041d498ff"),
            wallet("0x1B297a4fD9212E8f179c0Dd34330745041D498fF"),
        ];

        let book = generator.run_batch(&wallets).await.unwrap();

        assert_eq!(book.len(), 1);
        let key = "0x1b297a4fd9212e8f179c0dd34330745041d498ff";
        let record = book.get(key).unwrap();

        let digests = signer.digests.lock().unwrap();
        assert_eq!(digests.len(), 2);
        assert_eq!(token_digest(&record.salt, TEST_CONTRACT, wallets[1].address), digests[1]);
    }

    #[tokio::test]
    async fn keys_match_deduplicated_input() {
        let signer = test_signer();
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallets = [
            wallet("0x0ac1c1c174c0177bd7ec4b1067a2fc4563d39854"),
            wallet("0x3BA4F680E3ec4C321985c9407F0CE36815DBE192"),
            wallet("0x0AC1C1C174C0177BD7EC4B1067A2FC4563D39854"),
        ];

        let book = generator.run_batch(&wallets).await.unwrap();

        assert_eq!(
            book.keys().collect::<Vec<_>>(),
            vec![
                "0x0ac1c1c174c0177bd7ec4b1067a2fc4563d39854",
                "0x3ba4f680e3ec4c321985c9407f0ce36815dbe192",
            ]
        );
    }

    #[tokio::test]
    async fn signing_failure_aborts_with_partial_results() {
        let signer = FailingSigner {
            inner: test_signer(),
            fail_at: 1,
            calls: Mutex::new(0),
        };
        let generator = TokenBatchGenerator::new(TEST_CONTRACT, &signer);
        let wallets = [
            wallet("0x0ac1c1c174c0177bd7ec4b1067a2fc4563d39854"),
            wallet("0x3BA4F680E3ec4C321985c9407F0CE36815DBE192"),
            wallet("0x63fb324257b717F6699523EfDBe1DE5a657538C8"),
        ];

        let Err(BatchError::Signing { wallet, partial, .. }) = generator.run_batch(&wallets).await else {
            panic!("batch should fail on the second wallet");
        };

        assert_eq!(wallet, "0x3BA4F680E3ec4C321985c9407F0CE36815DBE192");
        assert_eq!(partial.len(), 1);
        assert!(partial.get("0x0ac1c1c174c0177bd7ec4b1067a2fc4563d39854").is_some());
        assert_eq!(*signer.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn signing_timeout_is_a_signing_error() {
        let generator =
            TokenBatchGenerator::new(TEST_CONTRACT, &HangingSigner).with_sign_timeout(Duration::from_millis(10));
        let wallets = [wallet("0x0ac1c1c174c0177bd7ec4b1067a2fc4563d39854")];

        let result = generator.run_batch(&wallets).await;

        match result {
            Err(BatchError::Signing { reason, partial, .. }) => {
                assert!(reason.to_string().contains("did not respond"));
                assert!(partial.is_empty());
            }
            Ok(_) => panic!("hanging signer should time out"),
        }
    }
}

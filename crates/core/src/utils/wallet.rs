use alloy::network::EthereumWallet;
use alloy::signers::ledger::{HDPath, LedgerSigner};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::trezor::{TrezorHDPath, TrezorSigner};
use dotenv::dotenv;
use eyre::{Result, eyre};
use log::info;
use std::env;

const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareWalletType {
    TREZOR,
    LEDGER,
}

/// Loads the signer for direct submissions.
///
/// A hardware wallet wins when requested, otherwise `PRIVATE_KEY` from the
/// environment (or `.env`). Returns `None` when neither is available, in which
/// case only read and multisig-preparation commands can run.
pub async fn load_wallet(
    hardware: Option<HardwareWalletType>,
    chain_id: u64,
) -> Result<Option<EthereumWallet>> {
    dotenv().ok();

    match hardware {
        Some(HardwareWalletType::LEDGER) => {
            let signer = LedgerSigner::new(HDPath::LedgerLive(0), Some(chain_id))
                .await
                .map_err(|e| eyre!("Failed to connect to Ledger: {}", e))?;
            info!("Using Ledger signer");
            Ok(Some(EthereumWallet::from(signer)))
        }
        Some(HardwareWalletType::TREZOR) => {
            let signer = TrezorSigner::new(TrezorHDPath::TrezorLive(0), Some(chain_id))
                .await
                .map_err(|e| eyre!("Failed to connect to Trezor: {}", e))?;
            info!("Using Trezor signer");
            Ok(Some(EthereumWallet::from(signer)))
        }
        None => match env::var(PRIVATE_KEY_VAR) {
            Ok(key) => {
                let signer: PrivateKeySigner = key
                    .trim()
                    .parse()
                    .map_err(|e| eyre!("Invalid {}: {}", PRIVATE_KEY_VAR, e))?;
                info!("Using local signer {}", signer.address());
                Ok(Some(EthereumWallet::from(signer)))
            }
            Err(_) => Ok(None),
        },
    }
}

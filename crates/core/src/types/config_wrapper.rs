use alloy::primitives::Address;
use eyre::{Result, eyre};
use std::path::PathBuf;
use std::{env, fs};
use toml::Value;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_LEDGER_DIR: &str = ".timelock";

pub struct ConfigWrapper {
    raw_config: Value,
}

impl ConfigWrapper {
    pub fn new(raw_config: Value) -> Self {
        Self { raw_config }
    }

    pub fn from_file(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let config_content = fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file {}: {}", path, e))?;
        let raw_config: Value = config_content.parse::<Value>()?;

        Ok(Self { raw_config })
    }

    /// Network name used to key the ledger file, falling back to the chain id.
    pub fn get_network_name(&self, network_id: u64) -> String {
        self.raw_config
            .get("networks")
            .and_then(|n| n.get(&network_id.to_string()))
            .and_then(|n| n.get("name"))
            .and_then(|n| n.as_str())
            .map(|n| n.to_string())
            .unwrap_or_else(|| network_id.to_string())
    }

    pub fn get_contract_address(&self, network_id: u64, contract: &str) -> Result<Address> {
        // Try network specific value first
        let value = self
            .raw_config
            .get("contracts")
            .and_then(|c| c.get(&network_id.to_string()))
            .and_then(|c| c.get(contract))
            .or_else(|| {
                // Fallback to default if network specific not found
                self.raw_config
                    .get("contracts")
                    .and_then(|c| c.get("default"))
                    .and_then(|c| c.get(contract))
            })
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                eyre!(
                    "{} address not found for network_id: {}",
                    contract,
                    network_id
                )
            })?;

        value
            .parse::<Address>()
            .map_err(|e| eyre!("Invalid {} address {}: {}", contract, value, e))
    }

    pub fn get_rpc_url(&self, network_id: u64) -> Result<String> {
        let url_str = self
            .raw_config
            .get("rpc_endpoints")
            .and_then(|r| r.get(&network_id.to_string()))
            .and_then(|r| r.as_str())
            .ok_or_else(|| eyre!("URL not found for network_id: {}", network_id))?;

        if let Some(env_var) = url_str.strip_prefix("env:") {
            env::var(env_var).map_err(|_| eyre!("Environment variable {} not set", env_var))
        } else {
            Ok(url_str.to_string())
        }
    }

    pub fn get_block_explorer_url(&self, network_id: u64) -> Result<String> {
        let url_str = self
            .raw_config
            .get("block_explorers")
            .and_then(|b| b.get(&network_id.to_string()))
            .and_then(|b| b.as_str())
            .ok_or_else(|| {
                eyre!(
                    "Block explorer URL not found for network_id: {}",
                    network_id
                )
            })?;

        Ok(url_str.trim_end_matches('/').to_string())
    }

    pub fn get_ledger_dir(&self) -> PathBuf {
        self.raw_config
            .get("ledger_dir")
            .and_then(|d| d.as_str())
            .unwrap_or(DEFAULT_LEDGER_DIR)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn config() -> ConfigWrapper {
        let raw = r#"
            ledger_dir = "/var/lib/timelock"

            [networks.250]
            name = "fantom"

            [rpc_endpoints]
            250 = "https://rpc.ftm.tools"
            4002 = "env:TIMELOCK_TEST_UNSET_RPC"

            [block_explorers]
            250 = "https://ftmscan.com/"

            [contracts.default]
            Timelock = "0x1111111111111111111111111111111111111111"

            [contracts.250]
            BeethovenxMasterChef = "0x8166994d9ebBe5829EC86Bd81258149B87faCfd3"
        "#;
        ConfigWrapper::new(raw.parse::<Value>().unwrap())
    }

    #[test]
    fn test_network_name_falls_back_to_chain_id() {
        let cw = config();
        assert_eq!(cw.get_network_name(250), "fantom");
        assert_eq!(cw.get_network_name(4002), "4002");
    }

    #[test]
    fn test_contract_address_prefers_network_then_default() {
        let cw = config();
        assert_eq!(
            cw.get_contract_address(250, "BeethovenxMasterChef").unwrap(),
            address!("0x8166994d9ebBe5829EC86Bd81258149B87faCfd3")
        );
        assert_eq!(
            cw.get_contract_address(250, "Timelock").unwrap(),
            address!("0x1111111111111111111111111111111111111111")
        );
        assert!(cw.get_contract_address(4002, "BeethovenxMasterChef").is_err());
    }

    #[test]
    fn test_rpc_url_env_indirection() {
        let cw = config();
        assert_eq!(cw.get_rpc_url(250).unwrap(), "https://rpc.ftm.tools");

        let err = cw.get_rpc_url(4002).unwrap_err();
        assert!(err.to_string().contains("TIMELOCK_TEST_UNSET_RPC"));
        assert!(cw.get_rpc_url(1).is_err());
    }

    #[test]
    fn test_paths_and_explorer() {
        let cw = config();
        assert_eq!(cw.get_ledger_dir(), PathBuf::from("/var/lib/timelock"));
        assert_eq!(
            cw.get_block_explorer_url(250).unwrap(),
            "https://ftmscan.com"
        );
        assert_eq!(
            ConfigWrapper::new(Value::Table(Default::default())).get_ledger_dir(),
            PathBuf::from(".timelock")
        );
    }
}

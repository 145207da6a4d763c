use crate::config::DnsConfig;
use crate::zone::{Result, ZoneError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Everything a name server pair needs for one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneArtifacts {
    pub domain: String,
    /// BIND master file
    pub zone_file: String,
    /// Stanza for the primary server
    pub primary_conf: String,
    /// Stanza for the secondary servers
    pub secondary_conf: String,
}

impl ZoneArtifacts {
    pub fn zone_file_name(&self) -> String {
        format!("{}.zone", self.domain)
    }

    pub fn primary_conf_name(&self) -> String {
        format!("{}.primary.conf", self.domain)
    }

    pub fn secondary_conf_name(&self) -> String {
        format!("{}.secondary.conf", self.domain)
    }
}

/// Ships rendered artifacts to where the name servers read them
pub trait Deployer {
    fn deploy(&self, artifacts: &ZoneArtifacts) -> Result<()>;
}

/// Writes artifacts into a local directory tree
#[derive(Debug, Clone)]
pub struct DirectoryDeployer {
    root: PathBuf,
    zone_dir: PathBuf,
    config_dir: PathBuf,
}

impl DirectoryDeployer {
    /// Put every artifact directly into `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            zone_dir: root.clone(),
            config_dir: root.clone(),
            root,
        }
    }

    /// Mirror the configured zone and config directories below `root`
    pub fn from_config<P: AsRef<Path>>(root: P, config: &DnsConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            zone_dir: below(&root, &config.zone_dir),
            config_dir: below(&root, &config.config_dir),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn zone_dir(&self) -> &Path {
        &self.zone_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

/// Join `dir` onto `root`, ignoring anything that would leave `root`
fn below(root: &Path, dir: &Path) -> PathBuf {
    let relative: PathBuf = dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    root.join(relative)
}

impl Deployer for DirectoryDeployer {
    fn deploy(&self, artifacts: &ZoneArtifacts) -> Result<()> {
        if artifacts.domain.is_empty() || artifacts.domain.contains(['/', '\\']) {
            return Err(ZoneError::Deploy(format!(
                "refusing to write files for domain {:?}",
                artifacts.domain
            )));
        }

        fs::create_dir_all(&self.zone_dir)?;
        fs::create_dir_all(&self.config_dir)?;

        for (dir, name, content) in [
            (&self.zone_dir, artifacts.zone_file_name(), &artifacts.zone_file),
            (&self.config_dir, artifacts.primary_conf_name(), &artifacts.primary_conf),
            (&self.config_dir, artifacts.secondary_conf_name(), &artifacts.secondary_conf),
        ] {
            fs::write(dir.join(&name), content)?;
        }

        info!(
            "Deployed zone {} to {}",
            artifacts.domain,
            self.root.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts(domain: &str) -> ZoneArtifacts {
        ZoneArtifacts {
            domain: domain.to_string(),
            zone_file: "$TTL 3600s\n".to_string(),
            primary_conf: "primary".to_string(),
            secondary_conf: "secondary".to_string(),
        }
    }

    #[test]
    fn test_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = DirectoryDeployer::new(dir.path().join("out"));
        deployer.deploy(&artifacts("example.com")).unwrap();

        let out = dir.path().join("out");
        assert_eq!(
            fs::read_to_string(out.join("example.com.zone")).unwrap(),
            "$TTL 3600s\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("example.com.primary.conf")).unwrap(),
            "primary"
        );
        assert_eq!(
            fs::read_to_string(out.join("example.com.secondary.conf")).unwrap(),
            "secondary"
        );
    }

    #[test]
    fn test_rejects_path_like_domain() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = DirectoryDeployer::new(dir.path());
        assert!(matches!(
            deployer.deploy(&artifacts("../etc")),
            Err(ZoneError::Deploy(_))
        ));
    }

    #[test]
    fn test_layout_follows_config_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = DnsConfig {
            zone_dir: PathBuf::from("/var/named"),
            config_dir: PathBuf::from("/etc/named/../zones.d"),
            ..Default::default()
        };
        let deployer = DirectoryDeployer::from_config(dir.path(), &config);
        assert_eq!(deployer.zone_dir(), dir.path().join("var/named"));
        assert_eq!(deployer.config_dir(), dir.path().join("etc/named/zones.d"));

        deployer.deploy(&artifacts("example.com")).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("var/named/example.com.zone")).unwrap(),
            "$TTL 3600s\n"
        );
        let conf_dir = dir.path().join("etc/named/zones.d");
        assert_eq!(
            fs::read_to_string(conf_dir.join("example.com.primary.conf")).unwrap(),
            "primary"
        );
        assert_eq!(
            fs::read_to_string(conf_dir.join("example.com.secondary.conf")).unwrap(),
            "secondary"
        );
        assert!(!dir.path().join("example.com.zone").exists());
    }
}

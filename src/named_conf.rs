//! `zone { ... }` stanzas for the primary and the secondary name servers
//!
//! The layout is consumed by the name server's configuration parser, so the
//! templates are reproduced literally.

use crate::config::DnsConfig;
use crate::zone::Zone;

/// Renders name server configuration stanzas for zones
#[derive(Debug, Clone, Copy)]
pub struct NamedConfRenderer<'a> {
    config: &'a DnsConfig,
}

impl<'a> NamedConfRenderer<'a> {
    pub fn new(config: &'a DnsConfig) -> Self {
        Self { config }
    }

    /// Stanza for the primary server, allowing transfers to the secondaries
    pub fn primary(&self, zone: &Zone) -> String {
        format!(
            "zone \"{domain}\" IN {{\n        \
             type master;\n        \
             masterfile-format text;\n        \
             file \"{domain}.zone\";\n        \
             allow-query {{ any; }};\n        \
             allow-transfer {{ {transfer}; }};\n        \
             notify yes;\n\
             }};\n",
            domain = zone.domain,
            transfer = self.config.secondary_name_server_ips.join("; "),
        )
    }

    /// Stanza for a secondary server replicating from the primary
    pub fn secondary(&self, zone: &Zone) -> String {
        format!(
            "zone \"{domain}\" IN {{\n    \
             type slave;\n    \
             masterfile-format text;\n    \
             file \"{domain}.zone\";\n    \
             allow-query {{ any; }};\n    \
             masters {{ {masters}; }};\n\
             }};",
            domain = zone.domain,
            masters = self.config.primary_name_server_ip,
        )
    }
}

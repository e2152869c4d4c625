// src/core/option_defaults.rs

use crate::core::{
    option_resolver::{DefaultContext, Registry, ResolveResult},
    paths,
};
use std::env;

pub const DEFAULT_KRB5_CONF: &str = "/etc/krb5.conf";
pub const DEFAULT_LDAP_CONF: &str = "/etc/ldap/ldap.conf";
pub const DEFAULT_KEYTAB: &str = "/etc/krb5.keytab";
pub const DEFAULT_MIN_ID: u32 = 1000;
pub const DEFAULT_MAX_ID: u32 = 60000;

/// Builds the registry used by the account tools.
///
/// Synonyms are registered but not installed; call
/// [`Registry::install_synonyms`] (or the session's) once the front-end has
/// decided which options it accepts.
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        // --- Handlers ---
        .register_handler("krb5conf", handle_path)
        .register_handler("ldapconf", handle_path)
        .register_handler("realm", handle_realm)
        .register_handler("keytab", handle_keytab)
        .register_handler("principal", handle_non_empty)
        .register_handler("server", handle_server)
        .register_handler("base", handle_non_empty)
        .register_handler("minid", handle_id)
        .register_handler("maxid", handle_id)
        // --- Defaults ---
        .register_default("krb5conf", &[], default_krb5conf)
        .register_default("ldapconf", &[], default_ldapconf)
        .register_default("realm", &["krb5conf"], default_realm)
        .register_default("keytab", &["krb5conf"], default_keytab)
        .register_default("principal", &["realm"], default_principal)
        .register_default("server", &["ldapconf", "realm"], default_server)
        .register_default("base", &["ldapconf", "realm"], default_base)
        .register_default("minid", &[], default_minid)
        .register_default("maxid", &[], default_maxid)
        // --- Synonyms ---
        .register_synonym("server", "uri")
        .register_synonym("base", "basedn")
        .register_synonym("principal", "user");
    registry
}

// --- HANDLERS ---

fn handle_path(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("path must not be empty".to_string());
    }
    paths::expand_path(trimmed)
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|e| e.to_string())
}

fn handle_non_empty(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn handle_realm(raw: &str) -> Result<String, String> {
    handle_non_empty(raw).map(|realm| realm.to_uppercase())
}

/// Accepts `FILE:`/`WRFILE:` keytab names as written in `krb5.conf`.
fn handle_keytab(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("FILE:")
        .or_else(|| trimmed.strip_prefix("WRFILE:"))
        .unwrap_or(trimmed);
    handle_path(without_prefix)
}

fn handle_server(raw: &str) -> Result<String, String> {
    let server = handle_non_empty(raw)?;
    if server.contains("://") {
        Ok(server)
    } else {
        Ok(format!("ldap://{}", server))
    }
}

fn handle_id(raw: &str) -> Result<String, String> {
    raw.trim()
        .parse::<u32>()
        .map(|id| id.to_string())
        .map_err(|e| format!("not a valid numeric id ({})", e))
}

// --- DEFAULTS ---

fn default_krb5conf(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    Ok(Some(
        env::var("KRB5_CONFIG").unwrap_or_else(|_| DEFAULT_KRB5_CONF.to_string()),
    ))
}

fn default_ldapconf(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    Ok(Some(
        env::var("LDAPCONF").unwrap_or_else(|_| DEFAULT_LDAP_CONF.to_string()),
    ))
}

/// `default_realm` from the Kerberos config, else the host's DNS domain.
fn default_realm(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    if let Some(realm) = ctx.config_value("krb5conf", "default_realm")? {
        return Ok(Some(realm));
    }
    match ctx.host().fqdn() {
        Ok(fqdn) => Ok(fqdn
            .split_once('.')
            .map(|(_, domain)| domain.to_uppercase())
            .filter(|domain| !domain.is_empty())),
        Err(e) => {
            log::debug!("{}: host lookup failed: {}", ctx.option(), e);
            Ok(None)
        }
    }
}

fn default_keytab(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    let configured = ctx.config_value("krb5conf", "default_keytab_name")?;
    Ok(Some(configured.unwrap_or_else(|| DEFAULT_KEYTAB.to_string())))
}

/// The host's service principal, `host/<fqdn>@<REALM>`.
fn default_principal(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    let Some(realm) = ctx.get("realm").map(str::to_string) else {
        return Ok(None);
    };
    let fqdn = ctx.host().fqdn().map_err(|e| ctx.collaborator_error(e))?;
    Ok(Some(format!("host/{}@{}", fqdn.to_lowercase(), realm)))
}

/// First available server among `URI` entries, `HOST` entries, then
/// `ldap://<realm domain>`.
fn default_server(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    let mut candidates: Vec<String> = Vec::new();
    for key in ["URI", "HOST"] {
        if let Some(value) = ctx.config_value("ldapconf", key)? {
            candidates.extend(value.split_whitespace().map(str::to_string));
        }
    }
    if let Some(realm) = ctx.get("realm") {
        candidates.push(realm.to_lowercase());
    }

    if candidates.is_empty() {
        return Ok(None);
    }

    for candidate in &candidates {
        let Ok(server) = handle_server(candidate) else {
            continue;
        };
        if ctx.directory().is_available(&server) {
            return Ok(Some(server));
        }
        log::debug!("{}: directory server '{}' is not available", ctx.option(), server);
    }

    Err(ctx.collaborator_error(crate::system::collaborators::CollaboratorError(format!(
        "no directory server available (tried: {})",
        candidates.join(", ")
    ))))
}

/// `BASE` from the LDAP config, else one `dc=` component per realm label.
fn default_base(ctx: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    if let Some(base) = ctx.config_value("ldapconf", "BASE")? {
        return Ok(Some(base));
    }
    Ok(ctx.get("realm").map(realm_to_base))
}

fn default_minid(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    Ok(Some(DEFAULT_MIN_ID.to_string()))
}

fn default_maxid(_: &mut DefaultContext<'_, '_>) -> ResolveResult<Option<String>> {
    Ok(Some(DEFAULT_MAX_ID.to_string()))
}

/// `EXAMPLE.COM` -> `dc=example,dc=com`.
pub fn realm_to_base(realm: &str) -> String {
    realm
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| format!("dc={}", label.to_lowercase()))
        .collect::<Vec<_>>()
        .join(",")
}

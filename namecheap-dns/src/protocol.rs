//! Namecheap XML API commands and payload mapping.
//!
//! Requests are form-encoded `POST`s carrying the credential fields plus command
//! parameters. Responses are `<ApiResponse Status="OK|ERROR">` documents; on success
//! the `<CommandResponse>` child holds one command-specific result element.

use std::fmt;

use crate::config::ContextConfig;
use crate::error::{NamecheapError, Result};
use crate::records::{HostRecord, Record, RecordKind};
use crate::types::{ApiErrorEntry, DomainInfo, Paging};
use crate::utils::datetime::parse_expiry;
use crate::xml::XmlElement;

/// Request parameters in send order.
pub type Params = Vec<(String, String)>;

/// TLDs assumed when the registrar's list cannot be fetched.
pub const FALLBACK_TLDS: &[&str] = &[".com", ".net", ".org", ".edu", ".gov", ".mil"];

/// Page size requested when listing domains; the server may answer with another.
pub const DOMAIN_PAGE_SIZE: u32 = 100;

/// Commands this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCommand {
    GetDomainList,
    GetTldList,
    GetDnsServers,
    GetDnsHosts,
    SetDnsHosts,
}

impl ApiCommand {
    pub const ALL: [Self; 5] = [
        Self::GetDomainList,
        Self::GetTldList,
        Self::GetDnsServers,
        Self::GetDnsHosts,
        Self::SetDnsHosts,
    ];

    /// Value of the `Command` form field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetDomainList => "namecheap.domains.getList",
            Self::GetTldList => "namecheap.domains.getTldList",
            Self::GetDnsServers => "namecheap.domains.dns.getList",
            Self::GetDnsHosts => "namecheap.domains.dns.getHosts",
            Self::SetDnsHosts => "namecheap.domains.dns.setHosts",
        }
    }

    /// Name of the result element inside `<CommandResponse>`.
    pub const fn result_element(self) -> &'static str {
        match self {
            Self::GetDomainList => "DomainGetListResult",
            Self::GetTldList => "Tlds",
            Self::GetDnsServers => "DomainDNSGetListResult",
            Self::GetDnsHosts => "DomainDNSGetHostsResult",
            Self::SetDnsHosts => "DomainDNSSetHostsResult",
        }
    }

    /// The command's result element, if the response carries one.
    pub fn result<'a>(self, response: &'a XmlElement) -> Option<&'a XmlElement> {
        response.child(self.result_element())
    }
}

impl fmt::Display for ApiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full form body: credential fields first, then the command parameters.
pub fn request_form(config: &ContextConfig, command: ApiCommand, params: &[(String, String)]) -> Params {
    let mut form: Params = vec![
        ("ApiUser".to_string(), config.api_user.clone()),
        ("ApiKey".to_string(), config.api_key.clone()),
        ("Command".to_string(), command.as_str().to_string()),
        ("UserName".to_string(), config.effective_user_name().to_string()),
        ("ClientIP".to_string(), config.client_ip.clone()),
    ];
    form.extend(params.iter().cloned());
    form
}

/// Parse a response body and unwrap its `<CommandResponse>`.
pub fn decode_response(body: &str) -> Result<XmlElement> {
    let root = XmlElement::parse(body)?;
    root.require_name("ApiResponse")?;

    let ok = root
        .attribute("Status")
        .is_some_and(|status| status.trim().eq_ignore_ascii_case("OK"));
    if !ok {
        return Err(api_errors(&root));
    }

    root.required_child("CommandResponse").cloned()
}

fn api_errors(root: &XmlElement) -> NamecheapError {
    let errors = match root.required_child("Errors") {
        Ok(errors) => errors,
        Err(e) => return e,
    };

    let entries: Vec<ApiErrorEntry> = errors
        .children()
        .iter()
        .filter(|child| child.name() == "Error")
        .map(|child| ApiErrorEntry {
            number: child.attribute_as("Number").unwrap_or(0),
            message: child.content(),
        })
        .collect();

    if entries.is_empty() {
        return NamecheapError::MissingElement {
            parent: Some("Errors".to_string()),
            element: "Error".to_string(),
        };
    }
    NamecheapError::Api { errors: entries }
}

/// `SLD`/`TLD` parameters for per-domain commands.
pub fn domain_params(sld: &str, tld: &str) -> Params {
    vec![
        ("SLD".to_string(), sld.to_string()),
        ("TLD".to_string(), tld.to_string()),
    ]
}

/// Parameters for one page of `domains.getList`.
pub fn domain_list_params(page: u32, page_size: u32) -> Params {
    vec![
        ("ListType".to_string(), "ALL".to_string()),
        ("PageSize".to_string(), page_size.to_string()),
        ("SortBy".to_string(), "NAME".to_string()),
        ("Page".to_string(), page.to_string()),
    ]
}

/// Parameters for `domains.dns.setHosts`, numbering records from 1.
///
/// `MXPrefN` is only sent for records with a positive preference.
pub fn set_hosts_params(sld: &str, tld: &str, records: &[Record]) -> Params {
    let mut params = domain_params(sld, tld);
    for (index, record) in records.iter().enumerate() {
        let n = index + 1;
        params.push((format!("HostName{n}"), record.name().to_string()));
        params.push((format!("RecordType{n}"), record.kind().as_str().to_string()));
        params.push((format!("Address{n}"), record.value().into_owned()));
        params.push((format!("TTL{n}"), record.ttl().to_string()));
        if record.preference() > 0 {
            params.push((format!("MXPref{n}"), record.preference().to_string()));
        }
    }
    params
}

/// One `<Domain>` entry of a domain listing.
pub fn parse_domain(element: &XmlElement) -> Result<DomainInfo> {
    element.require_name("Domain")?;
    Ok(DomainInfo {
        name: element.required_attribute("Name")?.to_string(),
        expires: element.attribute("Expires").and_then(parse_expiry),
        is_expired: element.attribute_as_bool("IsExpired"),
        auto_renew: element.attribute_as_bool("AutoRenew"),
        is_our_dns: element.attribute_as_bool("IsOurDNS"),
    })
}

/// The `<Paging>` block of a domain listing response.
pub fn parse_paging(response: &XmlElement) -> Result<Paging> {
    let paging = response.required_child("Paging")?;
    Ok(Paging {
        total_items: paging.required_child_content_as("TotalItems")?,
        page_size: paging.required_child_content_as("PageSize")?,
        current_page: paging.required_child_content_as("CurrentPage")?,
    })
}

/// Domains of one listing page; `None` when the result element is absent.
pub fn parse_domain_page(response: &XmlElement) -> Result<Option<(Vec<DomainInfo>, Paging)>> {
    let Some(list) = ApiCommand::GetDomainList.result(response) else {
        return Ok(None);
    };
    let paging = parse_paging(response)?;
    let domains = list
        .children_named("Domain")
        .map(parse_domain)
        .collect::<Result<Vec<_>>>()?;
    Ok(Some((domains, paging)))
}

/// TLDs of a `getTldList` response, each prefixed with a dot.
pub fn parse_tlds(response: &XmlElement) -> Result<Option<Vec<String>>> {
    let Some(list) = ApiCommand::GetTldList.result(response) else {
        return Ok(None);
    };
    list.children_named("Tld")
        .map(|tld| tld.required_attribute("Name").map(|name| format!(".{name}")))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Trimmed `<Nameserver>` entries; empty when the result element is absent.
pub fn parse_nameservers(response: &XmlElement) -> Vec<String> {
    ApiCommand::GetDnsServers
        .result(response)
        .map(|list| list.children_named("Nameserver").map(XmlElement::content).collect())
        .unwrap_or_default()
}

/// One `<Host Name Type Address MXPref TTL>` entry as a typed record.
///
/// A missing `TTL` falls back to the kind's default and a missing `MXPref` to 0.
pub fn parse_host(element: &XmlElement) -> Result<Record> {
    let name = element.required_attribute("Name")?;
    let kind: RecordKind = element.required_attribute("Type")?.parse()?;
    let value = element.required_attribute("Address")?;
    let preference = element.attribute_as("MXPref").unwrap_or(0);
    let ttl = element.attribute_as("TTL").unwrap_or_else(|| kind.default_ttl());
    Ok(Record::new(kind, name, value, ttl, preference))
}

/// Every `<Host>` of a `getHosts` response; empty when the result element is absent.
pub fn parse_hosts(response: &XmlElement) -> Result<Vec<Record>> {
    let Some(list) = ApiCommand::GetDnsHosts.result(response) else {
        return Ok(Vec::new());
    };
    list.children_named("Host").map(parse_host).collect()
}

/// `IsSuccess` of a `setHosts` response; `None` when the result element is absent.
pub fn parse_set_hosts_result(response: &XmlElement) -> Option<bool> {
    ApiCommand::SetDnsHosts
        .result(response)
        .map(|result| result.attribute_as_bool("IsSuccess"))
}

/// Split a domain name into its second-level and top-level parts.
///
/// The longest matching entry of `tlds` (dot-prefixed, matched ignoring case, ties broken
/// alphabetically) wins; otherwise the name is split at its last dot.
pub fn split_domain_name<S: AsRef<str>>(tlds: &[S], domain_name: &str) -> (String, String) {
    if domain_name.trim().is_empty() {
        return (String::new(), String::new());
    }
    let Some(last_dot) = domain_name.rfind('.') else {
        return (domain_name.to_string(), String::new());
    };

    let mut candidates: Vec<&str> = tlds.iter().map(AsRef::as_ref).collect();
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let lower = domain_name.to_ascii_lowercase();
    for tld in candidates {
        if tld.len() < 2 || tld.len() > domain_name.len() {
            continue;
        }
        if lower.ends_with(&tld.to_ascii_lowercase()) {
            let split = domain_name.len() - tld.len();
            if domain_name.is_char_boundary(split) {
                return (domain_name[..split].to_string(), tld[1..].to_string());
            }
        }
    }

    (
        domain_name[..last_dot].to_string(),
        domain_name[last_dot + 1..].to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(status: &str, inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="{status}" xmlns="http://api.namecheap.com/xml.response">{inner}</ApiResponse>"#
        )
    }

    fn decoded(inner: &str) -> XmlElement {
        let result = decode_response(&envelope("OK", inner));
        assert!(result.is_ok(), "decode failed: {result:?}");
        result.unwrap_or_default()
    }

    #[test]
    fn command_registry_is_complete() {
        for command in ApiCommand::ALL {
            assert!(command.as_str().starts_with("namecheap.domains."));
            assert!(!command.result_element().is_empty());
        }
        assert_eq!(
            ApiCommand::SetDnsHosts.to_string(),
            "namecheap.domains.dns.setHosts"
        );
    }

    #[test]
    fn request_form_starts_with_credentials() {
        let config = ContextConfig::sandbox("user", "key", "10.0.0.1");
        let form = request_form(&config, ApiCommand::GetDnsHosts, &domain_params("example", "com"));
        let names: Vec<&str> = form.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["ApiUser", "ApiKey", "Command", "UserName", "ClientIP", "SLD", "TLD"]
        );
        assert_eq!(form[2].1, "namecheap.domains.dns.getHosts");
        assert_eq!(form[3].1, "user");
    }

    #[test]
    fn ok_response_returns_command_response() {
        let response = decoded("<CommandResponse Type=\"x\"><Tlds /></CommandResponse>");
        assert_eq!(response.name(), "CommandResponse");
        assert!(ApiCommand::GetTldList.result(&response).is_some());
    }

    #[test]
    fn status_is_case_insensitive() {
        let result = decode_response(&envelope("ok", "<CommandResponse />"));
        assert!(result.is_ok());
    }

    #[test]
    fn error_response_collects_entries() {
        let body = envelope(
            "ERROR",
            r#"<Errors><Error Number="2019166">Domain not found</Error><Error>  Second  </Error></Errors>"#,
        );
        let result = decode_response(&body);
        assert!(
            matches!(&result, Err(NamecheapError::Api { .. })),
            "unexpected result: {result:?}"
        );
        let Err(NamecheapError::Api { errors }) = result else {
            return;
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].number, 2_019_166);
        assert_eq!(errors[0].message, "Domain not found");
        assert_eq!(errors[1].number, 0);
        assert_eq!(errors[1].message, "Second");
    }

    #[test]
    fn error_response_without_entries() {
        let result = decode_response(&envelope("ERROR", "<Errors />"));
        assert!(
            matches!(&result, Err(NamecheapError::MissingElement { parent: Some(p), element })
                if p == "Errors" && element == "Error"),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn error_response_without_errors_element() {
        let result = decode_response(&envelope("ERROR", ""));
        assert!(
            matches!(&result, Err(NamecheapError::MissingElement { element, .. }) if element == "Errors"),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn wrong_root_is_rejected() {
        let result = decode_response("<Other Status=\"OK\"><CommandResponse /></Other>");
        assert!(matches!(result, Err(NamecheapError::IncorrectElement { .. })));
    }

    #[test]
    fn ok_response_without_command_response() {
        let result = decode_response(&envelope("OK", ""));
        assert!(matches!(result, Err(NamecheapError::MissingElement { .. })));
    }

    #[test]
    fn domain_page_is_parsed() {
        let response = decoded(
            r#"<CommandResponse>
                 <DomainGetListResult>
                   <Domain Name="example.com" Expires="03/27/2026" IsExpired="false" AutoRenew="true" IsOurDNS="true" />
                   <domain Name="example.net" />
                 </DomainGetListResult>
                 <Paging><TotalItems>2</TotalItems><CurrentPage>1</CurrentPage><PageSize>20</PageSize></Paging>
               </CommandResponse>"#,
        );
        let page = parse_domain_page(&response);
        assert!(page.is_ok(), "unexpected result: {page:?}");
        let Ok(Some((domains, paging))) = page else {
            return;
        };
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].name, "example.com");
        assert!(domains[0].auto_renew && domains[0].is_our_dns && !domains[0].is_expired);
        assert!(domains[0].expires.is_some());
        assert_eq!(domains[1].expires, None);
        assert_eq!(paging.page_size, 20);
        assert!(!paging.has_next());
    }

    #[test]
    fn domain_without_name_is_rejected() {
        let element = XmlElement::new("Domain").with_attribute("IsExpired", "true");
        assert!(matches!(
            parse_domain(&element),
            Err(NamecheapError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn missing_domain_list_ends_paging() {
        let response = decoded("<CommandResponse />");
        assert!(matches!(parse_domain_page(&response), Ok(None)));
    }

    #[test]
    fn tlds_get_a_leading_dot() {
        let response = decoded(
            r#"<CommandResponse><Tlds><Tld Name="com" /><Tld Name="co.uk" /></Tlds></CommandResponse>"#,
        );
        let tlds = parse_tlds(&response);
        assert!(
            matches!(&tlds, Ok(Some(list)) if list == &[".com", ".co.uk"]),
            "unexpected result: {tlds:?}"
        );
    }

    #[test]
    fn nameservers_are_trimmed() {
        let response = decoded(
            r#"<CommandResponse><DomainDNSGetListResult>
                 <Nameserver> dns1.registrar-servers.com </Nameserver>
                 <Nameserver>dns2.registrar-servers.com</Nameserver>
               </DomainDNSGetListResult></CommandResponse>"#,
        );
        assert_eq!(
            parse_nameservers(&response),
            ["dns1.registrar-servers.com", "dns2.registrar-servers.com"]
        );
        assert!(parse_nameservers(&decoded("<CommandResponse />")).is_empty());
    }

    #[test]
    fn hosts_become_typed_records() {
        let response = decoded(
            r#"<CommandResponse><DomainDNSGetHostsResult>
                 <host Name="@" Type="mx" Address="mail.example.com." MXPref="10" TTL="1800" />
                 <Host Name="www" Type="A" Address="1.2.3.4" />
               </DomainDNSGetHostsResult></CommandResponse>"#,
        );
        let hosts = parse_hosts(&response);
        assert!(hosts.is_ok(), "unexpected result: {hosts:?}");
        let Ok(hosts) = hosts else {
            return;
        };
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].kind(), RecordKind::Mx);
        assert_eq!(hosts[0].preference(), 10);
        assert_eq!(hosts[0].ttl(), 1800);
        assert_eq!(hosts[1].kind(), RecordKind::A);
        assert_eq!(hosts[1].ttl(), RecordKind::A.default_ttl());
        assert_eq!(hosts[1].preference(), 0);
    }

    #[test]
    fn unknown_host_type_is_unsupported() {
        let element = XmlElement::new("Host")
            .with_attribute("Name", "@")
            .with_attribute("Type", "SRV")
            .with_attribute("Address", "x");
        assert!(matches!(
            parse_host(&element),
            Err(NamecheapError::UnsupportedRecordType { record_type }) if record_type == "SRV"
        ));
    }

    #[test]
    fn set_hosts_numbers_records_and_skips_zero_preference() {
        let records = vec![
            Record::new(RecordKind::A, "www", "1.2.3.4", 3600, 0),
            Record::new(RecordKind::Mx, "@", "mail.example.com.", 7200, 10),
        ];
        let params = set_hosts_params("example", "com", &records);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("SLD"), Some("example"));
        assert_eq!(get("HostName1"), Some("www"));
        assert_eq!(get("RecordType1"), Some("A"));
        assert_eq!(get("TTL1"), Some("3600"));
        assert_eq!(get("MXPref1"), None);
        assert_eq!(get("RecordType2"), Some("MX"));
        assert_eq!(get("MXPref2"), Some("10"));
    }

    #[test]
    fn set_hosts_result_flag() {
        let ok = decoded(r#"<CommandResponse><DomainDNSSetHostsResult IsSuccess="true" /></CommandResponse>"#);
        let failed = decoded(r#"<CommandResponse><DomainDNSSetHostsResult IsSuccess="false" /></CommandResponse>"#);
        assert_eq!(parse_set_hosts_result(&ok), Some(true));
        assert_eq!(parse_set_hosts_result(&failed), Some(false));
        assert_eq!(parse_set_hosts_result(&decoded("<CommandResponse />")), None);
    }

    #[test]
    fn split_handles_degenerate_names() {
        let tlds = [".com"];
        assert_eq!(split_domain_name(&tlds, ""), (String::new(), String::new()));
        assert_eq!(split_domain_name(&tlds, "   "), (String::new(), String::new()));
        assert_eq!(
            split_domain_name(&tlds, "localhost"),
            ("localhost".to_string(), String::new())
        );
    }

    #[test]
    fn split_prefers_longest_tld() {
        let tlds = [".uk", ".co.uk", ".com"];
        assert_eq!(
            split_domain_name(&tlds, "example.co.uk"),
            ("example".to_string(), "co.uk".to_string())
        );
        assert_eq!(
            split_domain_name(&tlds, "Example.COM"),
            ("Example".to_string(), "com".to_string())
        );
    }

    #[test]
    fn split_falls_back_to_last_dot() {
        let tlds = [".com"];
        assert_eq!(
            split_domain_name(&tlds, "example.dev"),
            ("example".to_string(), "dev".to_string())
        );
    }
}

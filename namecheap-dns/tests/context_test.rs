//! API context tests against a local mock server
//!
//! Run:
//! ```bash
//! cargo test -p namecheap-dns --test context_test
//! ```

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockServer, error_envelope, test_config};
use namecheap_dns::{
    ApiCommand, DnsApi, DnsContext, FALLBACK_TLDS, NamecheapError, RateLimiter, RateLimits,
    RecordView,
};

const GET_LIST: &str = "namecheap.domains.getList";
const GET_TLDS: &str = "namecheap.domains.getTldList";
const GET_SERVERS: &str = "namecheap.domains.dns.getList";
const GET_HOSTS: &str = "namecheap.domains.dns.getHosts";
const SET_HOSTS: &str = "namecheap.domains.dns.setHosts";

fn domain_page(names: &[&str], total: u32, page: u32, page_size: u32) -> String {
    let domains: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<Domain ID="1" Name="{name}" User="tester" Created="01/01/2024" Expires="01/01/2027" IsExpired="false" IsLocked="false" AutoRenew="true" WhoisGuard="NOTPRESENT" IsPremium="false" IsOurDNS="true" />"#
            )
        })
        .collect();
    format!(
        r#"<CommandResponse Type="namecheap.domains.getList">
  <DomainGetListResult>{domains}</DomainGetListResult>
  <Paging><TotalItems>{total}</TotalItems><CurrentPage>{page}</CurrentPage><PageSize>{page_size}</PageSize></Paging>
</CommandResponse>"#
    )
}

const TLDS: &str = r#"<CommandResponse Type="namecheap.domains.getTldList">
  <Tlds><Tld Name="com" /><Tld Name="co.uk" /></Tlds>
</CommandResponse>"#;

const HOSTS: &str = r#"<CommandResponse Type="namecheap.domains.dns.getHosts">
  <DomainDNSGetHostsResult Domain="example.co.uk" IsUsingOurDNS="true">
    <host HostId="1" Name="@" Type="MX" Address="mail.example.co.uk." MXPref="10" TTL="1800" />
    <host HostId="2" Name="www" Type="A" Address="1.2.3.4" MXPref="10" TTL="1800" />
  </DomainDNSGetHostsResult>
</CommandResponse>"#;

// ============ Domain list ============

#[tokio::test]
async fn test_domain_list_pages_with_server_page_size() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["a.com", "b.com"], 3, 1, 2));
    server.respond_ok(GET_LIST, &domain_page(&["c.com"], 3, 2, 2));
    let context = server.context();

    let domains = require_ok!(context.registered_domains().await);

    let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["a.com", "b.com", "c.com"]);
    assert!(domains[0].auto_renew && domains[0].is_our_dns);
    assert!(domains[0].expires.is_some());

    assert_eq!(server.commands(), [GET_LIST, GET_LIST]);
    assert_eq!(server.param(0, "PageSize").as_deref(), Some("100"));
    assert_eq!(server.param(0, "Page").as_deref(), Some("1"));
    assert_eq!(server.param(1, "PageSize").as_deref(), Some("2"));
    assert_eq!(server.param(1, "Page").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_requests_carry_credentials() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&[], 0, 1, 20));
    let context = server.context();

    require_ok!(context.registered_domains().await);

    let config = test_config();
    assert_eq!(server.param(0, "ApiUser"), Some(config.api_user.clone()));
    assert_eq!(server.param(0, "ApiKey"), Some(config.api_key.clone()));
    assert_eq!(server.param(0, "UserName"), Some(config.api_user.clone()));
    assert_eq!(server.param(0, "ClientIP"), Some(config.client_ip.clone()));
    assert_eq!(server.param(0, "Command").as_deref(), Some(GET_LIST));
}

#[tokio::test]
async fn test_domain_list_is_cached_until_reload() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["example.com"], 1, 1, 20));
    server.respond_ok(GET_LIST, &domain_page(&["example.com", "example.org"], 2, 1, 20));
    let context = server.context();

    require_ok!(context.registered_domains().await);
    let cached = require_ok!(context.registered_domains().await);
    assert_eq!(cached.len(), 1);
    assert_eq!(server.requests().len(), 1);

    let reloaded = require_ok!(context.reload().await);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_domain_lookup_ignores_case() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["example.com"], 1, 1, 20));
    let context = server.context();

    let domain = require_ok!(context.domain("EXAMPLE.com").await);
    let domain = require_some!(domain, "domain should be listed");
    assert_eq!(domain.name(), "example.com");
    assert!(domain.owns_store());

    assert!(matches!(context.domain("missing.com").await, Ok(None)));
    let all = require_ok!(context.domains().await);
    assert_eq!(all.len(), 1);
}

// ============ Errors ============

#[tokio::test]
async fn test_api_error_is_returned() {
    let server = MockServer::start().await;
    server.respond(
        GET_LIST,
        200,
        error_envelope(1_011_102, "Parameter APIKey is missing"),
    );
    let context = server.context();

    let result = context.registered_domains().await;
    assert!(
        matches!(&result, Err(NamecheapError::Api { errors })
            if errors.len() == 1 && errors[0].number == 1_011_102),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_failed_listing_is_not_cached() {
    let server = MockServer::start().await;
    server.respond(GET_LIST, 200, error_envelope(2_050_900, "Unknown error"));
    server.respond_ok(GET_LIST, &domain_page(&["example.com"], 1, 1, 20));
    let context = server.context();

    assert!(context.registered_domains().await.is_err());
    let domains = require_ok!(context.registered_domains().await);
    assert_eq!(domains.len(), 1);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    server.respond(GET_SERVERS, 500, "internal error");
    let context = server.context();

    let result = context.execute(ApiCommand::GetDnsServers, &[]).await;
    assert!(
        matches!(&result, Err(NamecheapError::HttpStatus { status: 500, .. })),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    server.respond(GET_SERVERS, 200, "<ApiResponse Status=\"OK\">");
    let context = server.context();

    let result = context.execute(ApiCommand::GetDnsServers, &[]).await;
    assert!(
        matches!(&result, Err(NamecheapError::XmlParse { .. })),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() {
    let context = require_ok!(
        DnsContext::builder(test_config())
            .endpoint("http://127.0.0.1:9/xml.response")
            .rate_limiter(Arc::new(RateLimiter::new()))
            .connect_timeout(Duration::from_secs(2))
            .build()
    );

    let result = context.execute(ApiCommand::GetTldList, &[]).await;
    assert!(
        matches!(
            &result,
            Err(NamecheapError::Network { .. } | NamecheapError::Timeout { .. })
        ),
        "unexpected result: {result:?}"
    );
}

// ============ Top-level domains ============

#[tokio::test]
async fn test_top_level_domains_are_loaded_once() {
    let server = MockServer::start().await;
    server.respond_ok(GET_TLDS, TLDS);
    let context = server.context();

    assert_eq!(context.top_level_domains().await, [".com", ".co.uk"]);
    assert_eq!(context.top_level_domains().await, [".com", ".co.uk"]);
    assert_eq!(server.commands(), [GET_TLDS]);

    assert_eq!(
        context.split_domain_name("shop.example.co.uk").await,
        ("shop.example".to_string(), "co.uk".to_string())
    );
}

#[tokio::test]
async fn test_top_level_domains_fall_back_on_failure() {
    let server = MockServer::start().await;
    server.respond(GET_TLDS, 500, "unavailable");
    let context = server.context();

    assert_eq!(context.top_level_domains().await, FALLBACK_TLDS);
    // the fallback is kept, no second request
    assert_eq!(context.top_level_domains().await, FALLBACK_TLDS);
    assert_eq!(server.commands(), [GET_TLDS]);
}

#[tokio::test]
async fn test_top_level_domains_fall_back_without_result() {
    let server = MockServer::start().await;
    server.respond_ok(GET_TLDS, "<CommandResponse />");
    let context = server.context();

    assert_eq!(context.top_level_domains().await, FALLBACK_TLDS);
}

// ============ Host records ============

#[tokio::test]
async fn test_host_records_load_and_save() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["example.co.uk"], 1, 1, 20));
    server.respond_ok(GET_TLDS, TLDS);
    server.respond_ok(GET_HOSTS, HOSTS);
    server.respond_ok(
        SET_HOSTS,
        r#"<CommandResponse Type="namecheap.domains.dns.setHosts">
  <DomainDNSSetHostsResult Domain="example.co.uk" IsSuccess="true" />
</CommandResponse>"#,
    );
    let context = server.context();

    let domain = require_ok!(context.domain("example.co.uk").await);
    let domain = require_some!(domain);
    let hosts = require_ok!(domain.host_records().await);
    assert_eq!(hosts.keys(), ["@", "www"]);
    assert_eq!(hosts.get("www").ipv4_addresses().ttl(), 1800);

    hosts.get("www").ipv4_addresses().add("5.6.7.8");
    assert!(require_ok!(domain.save().await));
    assert!(domain.save_errors().is_empty());

    assert_eq!(server.commands(), [GET_LIST, GET_TLDS, GET_HOSTS, SET_HOSTS]);
    assert_eq!(server.param(2, "SLD").as_deref(), Some("example"));
    assert_eq!(server.param(2, "TLD").as_deref(), Some("co.uk"));

    let set = 3;
    assert_eq!(server.param(set, "HostName1").as_deref(), Some("@"));
    assert_eq!(server.param(set, "RecordType1").as_deref(), Some("MX"));
    assert_eq!(server.param(set, "MXPref1").as_deref(), Some("10"));
    assert_eq!(server.param(set, "Address2").as_deref(), Some("1.2.3.4"));
    assert_eq!(server.param(set, "MXPref2"), None);
    assert_eq!(server.param(set, "Address3").as_deref(), Some("5.6.7.8"));
    assert_eq!(server.param(set, "TTL3").as_deref(), Some("1800"));
    assert_eq!(server.param(set, "HostName4"), None);
}

#[tokio::test]
async fn test_rejected_save_is_reported() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["example.co.uk"], 1, 1, 20));
    server.respond_ok(GET_TLDS, TLDS);
    server.respond_ok(GET_HOSTS, HOSTS);
    server.respond(SET_HOSTS, 200, error_envelope(2_019_166, "Domain not found"));
    let context = server.context();

    let domain = require_ok!(context.domain("example.co.uk").await);
    let domain = require_some!(domain);
    assert!(!require_ok!(domain.save().await));

    let errors = domain.save_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("API: "));
    assert!(errors[0].contains("Domain not found"));
}

#[tokio::test]
async fn test_name_servers() {
    let server = MockServer::start().await;
    server.respond_ok(GET_LIST, &domain_page(&["example.com"], 1, 1, 20));
    server.respond_ok(GET_TLDS, TLDS);
    server.respond_ok(
        GET_SERVERS,
        r#"<CommandResponse Type="namecheap.domains.dns.getList">
  <DomainDNSGetListResult Domain="example.com" IsUsingOurDNS="true">
    <Nameserver>dns1.registrar-servers.com</Nameserver>
    <Nameserver>dns2.registrar-servers.com</Nameserver>
  </DomainDNSGetListResult>
</CommandResponse>"#,
    );
    let context = server.context();

    let domain = require_ok!(context.domain("example.com").await);
    let domain = require_some!(domain);
    let servers = require_ok!(domain.dns_servers().await);
    assert_eq!(
        servers,
        ["dns1.registrar-servers.com", "dns2.registrar-servers.com"]
    );
}

// ============ Call budget ============

#[tokio::test]
async fn test_exhausted_budget_times_out() {
    let server = MockServer::start().await;
    server.respond_ok(GET_TLDS, TLDS);
    let limiter = RateLimiter::builder()
        .limits(RateLimits {
            per_minute: 1,
            per_hour: 10,
            per_day: 10,
        })
        .build();
    let context = require_ok!(
        DnsContext::builder(test_config())
            .endpoint(server.endpoint.clone())
            .rate_limiter(Arc::new(limiter))
            .max_wait(Duration::from_millis(50))
            .build()
    );

    require_ok!(context.execute(ApiCommand::GetTldList, &[]).await);
    let result = context.execute(ApiCommand::GetDnsServers, &[]).await;

    assert!(
        matches!(&result, Err(NamecheapError::CallSlotTimeout { command, .. })
            if command == GET_SERVERS),
        "unexpected result: {result:?}"
    );
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_contexts_with_same_credentials_share_a_limiter() {
    let server = MockServer::start().await;
    server.respond_ok(GET_TLDS, TLDS);
    server.respond_ok(GET_TLDS, TLDS);
    let limiter = Arc::new(RateLimiter::new());
    let build = || {
        DnsContext::builder(test_config())
            .endpoint(server.endpoint.clone())
            .rate_limiter(Arc::clone(&limiter))
            .build()
    };
    let first = require_ok!(build());
    let second = require_ok!(build());

    require_ok!(first.execute(ApiCommand::GetTldList, &[]).await);
    require_ok!(second.execute(ApiCommand::GetTldList, &[]).await);

    let key = test_config().credential_key();
    assert_eq!(limiter.logged_calls(&key), 2);
    assert_eq!(limiter.logged_commands(&key), [GET_TLDS, GET_TLDS]);
}

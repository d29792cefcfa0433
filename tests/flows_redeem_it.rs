#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_session_broker::{
	_preludet::*,
	auth::ProviderId,
	error::{ConfigError, ValidationError},
	provider::ProviderDescriptor,
};

const CLIENT_ID: &str = "client-redeem";
const CLIENT_SECRET: &str = "secret-redeem";
const REDIRECT_URI: &str = "https://gateway.example.com/oauth2/callback";

#[tokio::test]
async fn redeem_builds_a_refreshable_session() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(descriptor_for(&server.base_url()), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.header("accept", "application/json")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "code-123")
				.form_urlencoded_tuple("redirect_uri", REDIRECT_URI)
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A1\",\"expires_in\":3600,\"refresh_token\":\"R1\",\"token_type\":\"bearer\"}");
		})
		.await;
	let session =
		broker.redeem(REDIRECT_URI, "code-123").await.expect("Code redemption should succeed.");

	mock.assert_async().await;

	assert_eq!(session.access_token.expose(), "A1");
	assert_eq!(session.refresh_token.expose(), "R1");
	assert!(!session.is_expired());
	assert_eq!(session.expires_on.nanosecond(), 0);
}

#[tokio::test]
async fn redeem_sends_protected_resource() {
	let server = MockServer::start_async().await;
	let base = server.base_url();
	let url = |path: &str| Url::parse(&format!("{base}{path}")).expect("Mock URL should parse.");
	let descriptor =
		ProviderDescriptor::builder(ProviderId::new("portal").expect("Identifier should be valid."))
			.token_endpoint(url("/oauth2/access_token"))
			.profile_endpoint(url("/api/user"))
			.protected_resource(
				Url::parse("https://api.example.com/").expect("Resource URL should parse."),
			)
			.allow_insecure_endpoints(true)
			.build()
			.expect("Descriptor with a protected resource should build.");
	let broker = build_reqwest_test_broker(descriptor, CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.form_urlencoded_tuple("resource", "https://api.example.com/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"A1\",\"expires_in\":60}");
		})
		.await;
	let session = broker
		.redeem(REDIRECT_URI, "code-123")
		.await
		.expect("Redemption with a resource should succeed.");

	mock.assert_async().await;

	assert!(!session.can_refresh(), "No refresh token was issued.");
}

#[tokio::test]
async fn empty_code_is_rejected_before_any_request() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(descriptor_for(&server.base_url()), CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(200);
		})
		.await;
	let err = broker.redeem(REDIRECT_URI, "").await.expect_err("An empty code must be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::MissingCode)));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_redemption_keeps_provider_body() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(descriptor_for(&server.base_url()), CLIENT_ID, CLIENT_SECRET);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token");
			then.status(401).body("code already used");
		})
		.await;
	let err = broker
		.redeem(REDIRECT_URI, "code-123")
		.await
		.expect_err("A 401 from the token endpoint should fail redemption.");

	match err {
		Error::ProviderRejection { status, body, .. } => {
			assert_eq!(status, 401);
			assert_eq!(body, "code already used");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[test]
fn login_url_carries_authorization_parameters() {
	let broker =
		build_reqwest_test_broker(descriptor_for("https://id.example.com"), CLIENT_ID, CLIENT_SECRET);
	let url = broker.login_url(REDIRECT_URI, "state-xyz").expect("Login URL should build.");
	let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();

	assert_eq!(url.path(), "/oauth2/authorize");
	assert_eq!(
		pairs,
		[
			("response_type".to_owned(), "code".to_owned()),
			("client_id".to_owned(), CLIENT_ID.to_owned()),
			("redirect_uri".to_owned(), REDIRECT_URI.to_owned()),
			("scope".to_owned(), "basic".to_owned()),
			("state".to_owned(), "state-xyz".to_owned()),
		]
	);
}

#[test]
fn login_url_requires_an_authorization_endpoint() {
	let descriptor =
		ProviderDescriptor::builder(ProviderId::new("portal").expect("Identifier should be valid."))
			.token_endpoint(
				Url::parse("https://id.example.com/oauth2/access_token")
					.expect("Token URL should parse."),
			)
			.profile_endpoint(
				Url::parse("https://id.example.com/api/user").expect("Profile URL should parse."),
			)
			.build()
			.expect("Descriptor without a login endpoint should build.");
	let broker = build_reqwest_test_broker(descriptor, CLIENT_ID, CLIENT_SECRET);
	let err = broker.login_url(REDIRECT_URI, "state").expect_err("Login URL needs an endpoint.");

	assert!(matches!(err, Error::Config(ConfigError::MissingEndpoint { .. })));
}

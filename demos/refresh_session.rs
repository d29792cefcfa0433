//! Demonstrates a gateway's session lifecycle against a mock provider: redeeming a code, letting
//! the session expire, and refreshing it from several concurrent requests with a single exchange.

// std
use std::time::Duration as StdDuration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use oauth2_session_broker::{
	auth::ProviderId,
	flows::{RefreshOutcome, ReqwestBroker},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderDescriptor,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let redeem_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/access_token").form_urlencoded_tuple("code", "demo-code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-1\",\"expires_in\":3600,\"refresh_token\":\"refresh-1\"}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.form_urlencoded_tuple("refresh_token", "refresh-1");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(100))
				.body("{\"access_token\":\"access-2\",\"expires_in\":3600,\"refresh_token\":\"refresh-2\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user").header("authorization", "Bearer access-2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"ops@example.com\"}");
		})
		.await;
	let descriptor = ProviderDescriptor::builder(ProviderId::new("demo-portal")?)
		.authorization_endpoint(Url::parse(&server.url("/oauth2/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/oauth2/access_token"))?)
		.profile_endpoint(Url::parse(&server.url("/api/user"))?)
		.allow_insecure_endpoints(true)
		.build()?;
	let broker = ReqwestBroker::with_http_client(
		descriptor,
		"demo-client",
		ReqwestHttpClient::with_timeout(StdDuration::from_secs(5))?,
		ReqwestTransportErrorMapper,
	)
	.with_client_secret("demo-secret");
	let redirect_uri = "https://gateway.example.com/oauth2/callback";

	println!("Login URL: {}", broker.login_url(redirect_uri, "demo-state")?);

	let mut session = broker.redeem(redirect_uri, "demo-code").await?;

	redeem_mock.assert_async().await;
	println!("Redeemed: {session}");

	// Pretend the access token aged out while two browser tabs share the same cookie.
	session.expires_on = OffsetDateTime::now_utc() - Duration::seconds(1);

	let mut other_tab = session.clone();
	let (first, second) = tokio::join!(
		broker.refresh_if_needed(Some(&mut session)),
		broker.refresh_if_needed(Some(&mut other_tab)),
	);
	let outcomes = [first?, second?];

	refresh_mock.assert_calls_async(1).await;
	println!("Refresh outcomes: {outcomes:?}");
	println!(
		"Exchanges performed: {}",
		outcomes.iter().filter(|outcome| **outcome == RefreshOutcome::Refreshed).count()
	);

	let email = broker.email(&session).await?;

	profile_mock.assert_async().await;
	println!("Signed in as {email}; session valid until {}", session.expires_on);
	println!("Refresh metrics: {:?}", broker.refresh_metrics);

	Ok(())
}

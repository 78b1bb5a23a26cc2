use hyper::client::HttpConnector;
use hyper::{Body, Client};
use hyper_tls::HttpsConnector;

/// Outbound client shared by the relay, the reputation client and the content scanner.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build a pooled client that speaks both http:// and https://
pub fn build_client() -> HttpClient {
    Client::builder().build::<_, Body>(HttpsConnector::new())
}

//! reqwest implementation of the portal API
//!
//! The portal's certificate chain does not validate, so certificate checks
//! are turned off for this client.

use crate::config::{API_URL, LOGIN_URL, REQUEST_TIMEOUT, USER_AGENT};
use crate::error::{ErrorKind, Result};
use crate::interface::RequestApi;
use crate::model::dtos::RegistrationForm;
use crate::session::CookieSnapshot;
use reqwest::{
    Client,
    header::{COOKIE, HeaderMap, HeaderValue, REFERER},
};

/// HTTP client for the USTB teaching portal
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    api_url: String,
}

impl PortalClient {
    pub fn new() -> Result<Self> {
        Self::with_api_url(API_URL)
    }

    /// Point the client at another `addGouwuche` endpoint.
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

impl RequestApi for PortalClient {
    async fn add_to_cart(&self, form: RegistrationForm, cookies: CookieSnapshot) -> Result<String> {
        let headers = build_headers(&cookies)?;

        let resp = self
            .client
            .post(&self.api_url)
            .headers(headers)
            .form(form.fields())
            .send()
            .await?;

        Ok(resp.text().await?)
    }
}

fn build_headers(cookies: &CookieSnapshot) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(LOGIN_URL));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    if !cookies.is_empty() {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookies.to_header_value())
                .map_err(|e| ErrorKind::ParseError(e.to_string()))?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionCookies;

    #[test]
    fn headers_carry_referer_and_cookies() {
        let session = SessionCookies::new();
        session.upsert("JSESSIONID", "abc");
        session.upsert("route", "r1");

        let headers = build_headers(&session.snapshot()).unwrap();
        assert_eq!(headers[REFERER], LOGIN_URL);
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
        assert_eq!(headers[COOKIE], "JSESSIONID=abc; route=r1");
    }

    #[test]
    fn cookie_values_with_control_chars_are_rejected() {
        let session = SessionCookies::new();
        session.upsert("bad", "a\nb");
        assert!(build_headers(&session.snapshot()).is_err());
    }

    #[test]
    fn client_builds() {
        assert!(PortalClient::new().is_ok());
    }
}

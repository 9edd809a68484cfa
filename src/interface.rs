use crate::error::Result;
use crate::model::dtos::RegistrationForm;
use crate::session::CookieSnapshot;
use std::future::Future;

/// Common interface for the portal operations the poller needs.
///
/// Implemented over reqwest for the live portal and by scripted clients in
/// tests. The returned future must be `Send` so attempts can run on a
/// spawned task.
pub trait RequestApi: Send + Sync + 'static {
    /// Submit one add-to-cart registration request and return the raw body.
    fn add_to_cart(
        &self,
        form: RegistrationForm,
        cookies: CookieSnapshot,
    ) -> impl Future<Output = Result<String>> + Send;
}

//! Application module - registration loop and the controller around it
//!
//! [`poller`] owns the fixed-interval loop; [`controller`] holds the user's
//! selections and the course catalog and feeds them into the poller.

pub mod controller;
pub mod poller;

pub use controller::Controller;
pub use poller::{AttemptOutcome, PollEvent, PollState, Poller, classify_response};

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::Result;
    use crate::interface::RequestApi;
    use crate::model::dtos::RegistrationForm;
    use crate::model::structs::CourseRecord;
    use crate::session::CookieSnapshot;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Replays canned responses, then answers with the fallback body.
    pub struct ScriptedClient {
        script: Mutex<VecDeque<Result<String>>>,
        fallback: String,
        delay: Option<Duration>,
        calls: AtomicUsize,
        last_form: Mutex<Option<RegistrationForm>>,
    }

    impl ScriptedClient {
        pub fn new(script: Vec<Result<String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: String::new(),
                delay: None,
                calls: AtomicUsize::new(0),
                last_form: Mutex::new(None),
            }
        }

        pub fn always(body: &str) -> Self {
            Self {
                fallback: body.to_string(),
                ..Self::new(Vec::new())
            }
        }

        /// Hold every reply for `delay` before answering.
        pub fn with_delay(self, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..self
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_form(&self) -> Option<RegistrationForm> {
            self.last_form.lock().unwrap().clone()
        }
    }

    impl RequestApi for ScriptedClient {
        async fn add_to_cart(
            &self,
            form: RegistrationForm,
            _cookies: CookieSnapshot,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_form.lock().unwrap() = Some(form);
            let next = self.script.lock().unwrap().pop_front();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            next.unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    pub fn sample_course() -> CourseRecord {
        CourseRecord {
            name: "Intro".to_string(),
            pid: "123".to_string(),
            course_code: "CS101".to_string(),
            teacher: "Dr. X".to_string(),
        }
    }
}

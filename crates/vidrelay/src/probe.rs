use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{Rejection, describe_timeout};
use crate::http::Transport;

/// Confirms a media URL actually serves video before its instance's response
/// is accepted.
///
/// One short partial fetch, no redirects beyond what the transport follows
/// on its own, no retries. Every failure is a [`Rejection::StreamUnplayable`]
/// charged to the instance that produced the URL.
pub struct StreamProbe<'a> {
    transport: &'a dyn Transport,
    timeout: Duration,
}

impl<'a> StreamProbe<'a> {
    pub fn new(transport: &'a dyn Transport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn check(&self, media_url: &str) -> Result<(), Rejection> {
        let url = Url::parse(media_url)
            .map_err(|e| Rejection::unplayable(format!("invalid media url: {e}")))?;

        let reply = match tokio::time::timeout(self.timeout, self.transport.probe(&url, self.timeout)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return Err(Rejection::unplayable(format!("probe failed: {e}"))),
            Err(_) => {
                return Err(Rejection::unplayable(format!(
                    "probe {}",
                    describe_timeout(self.timeout)
                )));
            }
        };

        if !(200..300).contains(&reply.status) {
            return Err(Rejection::unplayable(format!(
                "media url answered HTTP {}",
                reply.status
            )));
        }

        match reply.content_type.as_deref() {
            Some(content_type) if is_video(content_type) => {
                debug!(url = %url, content_type, "Stream probe accepted");
                Ok(())
            }
            Some(content_type) => Err(Rejection::unplayable(format!(
                "content type `{content_type}` is not video"
            ))),
            None => Err(Rejection::unplayable("no content type declared")),
        }
    }
}

fn is_video(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("video/"))
}

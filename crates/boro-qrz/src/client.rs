//! QRZ XML interface client.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use boro_core::error::{AuthError, DecodeError, SessionFault};
use boro_core::{Callsign, Credentials, LookupResult, Result, SessionKey};

use crate::decode::{SessionEnvelope, SessionStatus, decode};
use crate::session::SessionStore;
use crate::transport::{HttpTransport, Transport};

/// A client holding an authenticated QRZ session.
///
/// Clients are only handed out after a successful login. When the service
/// drops the session, the next lookup logs in again and retries once.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use internal `Arc`) and lookups may run
/// concurrently. The session key is copied out before each request, so a
/// slow request never blocks other callers. Two callers that both see an
/// expired session will both log in; the last key written wins.
///
/// # Example
///
/// ```no_run
/// use boro_core::{Callsign, Credentials, EndpointUrl};
/// use boro_qrz::QrzClient;
///
/// # async fn example() -> Result<(), boro_core::Error> {
/// let endpoint = EndpointUrl::new("https://xmldata.qrz.com/xml/current/")?;
/// let credentials = Credentials::new(endpoint, "N0CALL", "secret", "boro/0.1");
/// let client = QrzClient::new(credentials).await?;
///
/// let record = client.lookup(&Callsign::new("W1AW")?).await?;
/// println!("{}: {:?}", record.call, record.email);
/// # Ok(())
/// # }
/// ```
pub struct QrzClient<T = HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T> {
    credentials: Credentials,
    transport: T,
    session: SessionStore,
}

/// Outcome of a single lookup request.
enum Attempt {
    Found(LookupResult),
    Expired(Option<SessionFault>),
}

impl QrzClient<HttpTransport> {
    /// Log in to the endpoint named in `credentials` and return a ready client.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, answers with a
    /// non-2xx status or malformed XML, or rejects the credentials (the
    /// service's message is kept verbatim).
    pub async fn new(credentials: Credentials) -> Result<Self> {
        let transport = HttpTransport::new(credentials.endpoint().clone(), credentials.agent())?;
        Self::with_transport(credentials, transport).await
    }
}

impl<T: Transport> QrzClient<T> {
    /// Log in through a custom transport and return a ready client.
    ///
    /// # Errors
    ///
    /// Same as [`QrzClient::new`].
    pub async fn with_transport(credentials: Credentials, transport: T) -> Result<Self> {
        let client = Self {
            inner: Arc::new(ClientInner {
                credentials,
                transport,
                session: SessionStore::new(),
            }),
        };

        client.authenticate().await?;
        Ok(client)
    }

    /// Look up a callsign.
    ///
    /// If the response shows the session has expired, logs in again and
    /// repeats the lookup exactly once.
    ///
    /// # Errors
    ///
    /// Network, status and decode errors are returned as they occur. A
    /// service fault on a live session (e.g. "Not found") is returned as
    /// [`boro_core::Error::Fault`]. If the retried lookup reports a fault or
    /// an expired session again, that is returned too.
    #[instrument(skip_all, fields(%callsign))]
    pub async fn lookup(&self, callsign: &Callsign) -> Result<LookupResult> {
        match self.lookup_once(callsign).await? {
            Attempt::Found(record) => Ok(record),
            Attempt::Expired(fault) => {
                info!(
                    reason = fault.as_ref().map(|f| f.message.as_str()),
                    "Session expired, logging in again"
                );
                self.authenticate().await?;

                match self.lookup_once(callsign).await? {
                    Attempt::Found(record) => Ok(record),
                    Attempt::Expired(Some(fault)) => Err(fault.into()),
                    Attempt::Expired(None) => Err(AuthError::SessionExpired.into()),
                }
            }
        }
    }

    /// Look up a callsign given as a string.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if `callsign` is not a valid callsign,
    /// otherwise the same as [`QrzClient::lookup`].
    pub async fn callsign_lookup(&self, callsign: &str) -> Result<LookupResult> {
        let callsign = Callsign::new(callsign)?;
        self.lookup(&callsign).await
    }

    /// Returns the current session key.
    pub fn session_key(&self) -> Option<SessionKey> {
        self.inner.session.get()
    }

    /// Log in and store the new session key.
    #[instrument(skip(self), fields(username = %self.inner.credentials.username()))]
    async fn authenticate(&self) -> Result<SessionKey> {
        info!("Creating new session");

        let credentials = &self.inner.credentials;
        let body = self
            .inner
            .transport
            .request(&[
                ("username", credentials.username()),
                ("password", credentials.password()),
                ("agent", credentials.agent()),
            ])
            .await?;

        let session = decode(&body)?.into_session();
        if let Some(fault) = session.fault() {
            warn!(fault = %fault, "Login rejected");
            return Err(AuthError::Rejected(fault).into());
        }

        let SessionStatus::Active { key } = session.status() else {
            return Err(AuthError::MissingKey.into());
        };

        log_session_notices(&session);
        self.inner.session.set(key.clone());

        debug!("Session created successfully");
        Ok(key)
    }

    /// One lookup request, classified by whether the session was still live.
    async fn lookup_once(&self, callsign: &Callsign) -> Result<Attempt> {
        // Copied out so the lock is released before the request.
        let Some(key) = self.inner.session.get() else {
            return Ok(Attempt::Expired(None));
        };

        debug!("Looking up callsign");
        let body = self
            .inner
            .transport
            .request(&[("callsign", callsign.as_str()), ("s", key.as_str())])
            .await?;

        let envelope = decode(&body)?.into_record();
        match envelope.session.status() {
            SessionStatus::Absent { fault } => Ok(Attempt::Expired(fault)),
            SessionStatus::Active { .. } => {
                if let Some(fault) = envelope.session.fault() {
                    return Err(fault.into());
                }

                let record = envelope
                    .record
                    .ok_or(DecodeError::MissingElement { element: "Callsign" })?;

                if record.call != callsign.as_str() {
                    debug!(returned = %record.call, "Directory answered for a different callsign");
                }

                Ok(Attempt::Found(record))
            }
        }
    }
}

fn log_session_notices(session: &SessionEnvelope) {
    if let Some(message) = &session.message {
        info!(%message, "QRZ notice");
    }
    debug!(
        count = session.count.as_deref(),
        sub_exp = session.sub_exp.as_deref(),
        "Session details"
    );
}

impl<T> Clone for QrzClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for QrzClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrzClient")
            .field("endpoint", self.inner.credentials.endpoint())
            .field("username", &self.inner.credentials.username())
            .field("session", &self.inner.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use boro_core::{EndpointUrl, Error};

    /// Transport that replays canned bodies and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Vec<u8>>>,
        requests: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl ScriptedTransport {
        fn new(bodies: &[&str]) -> Self {
            Self {
                responses: Mutex::new(bodies.iter().map(|b| b.as_bytes().to_vec()).collect()),
                requests: Mutex::default(),
            }
        }

        fn requests(&self) -> Vec<Vec<(String, String)>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push(
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            );
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request"))
        }
    }

    fn credentials() -> Credentials {
        let endpoint = EndpointUrl::new("https://xmldata.qrz.com/xml/current/").unwrap();
        Credentials::new(endpoint, "N0CALL", "secret", "boro/test")
    }

    fn session(key: &str) -> String {
        format!("<QRZDatabase><Session><Key>{key}</Key></Session></QRZDatabase>")
    }

    fn record(call: &str, key: &str) -> String {
        format!(
            "<QRZDatabase><Callsign><call>{call}</call><email>{}@example.com</email></Callsign>\
             <Session><Key>{key}</Key></Session></QRZDatabase>",
            call.to_lowercase()
        )
    }

    fn expired(fault: Option<&str>) -> String {
        match fault {
            Some(fault) => format!(
                "<QRZDatabase><Session><Error>{fault}</Error></Session></QRZDatabase>"
            ),
            None => "<QRZDatabase><Session></Session></QRZDatabase>".to_string(),
        }
    }

    fn param<'a>(request: &'a [(String, String)], name: &str) -> Option<&'a str> {
        request
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    async fn client_with(bodies: &[&str]) -> (QrzClient<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(bodies));
        let client = QrzClient::with_transport(credentials(), Arc::clone(&transport))
            .await
            .unwrap();
        (client, transport)
    }

    #[tokio::test]
    async fn login_sends_credentials_and_stores_key() {
        let (client, transport) = client_with(&[&session("abc")]).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(param(&requests[0], "username"), Some("N0CALL"));
        assert_eq!(param(&requests[0], "password"), Some("secret"));
        assert_eq!(param(&requests[0], "agent"), Some("boro/test"));
        assert_eq!(client.session_key().unwrap().as_str(), "abc");
    }

    #[tokio::test]
    async fn login_fault_is_returned_verbatim() {
        let transport = ScriptedTransport::new(&[&expired(Some("Username/password incorrect"))]);
        let err = QrzClient::with_transport(credentials(), transport)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(AuthError::Rejected(_))));
        assert_eq!(err.fault().unwrap().message, "Username/password incorrect");
    }

    #[tokio::test]
    async fn login_fault_wins_over_key() {
        let body = "<Session><Key>abc</Key><Error>Account disabled</Error></Session>";
        let err = QrzClient::with_transport(credentials(), ScriptedTransport::new(&[body]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Rejected(_))));
    }

    #[tokio::test]
    async fn login_without_key_fails() {
        let err = QrzClient::with_transport(credentials(), ScriptedTransport::new(&[&expired(None)]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::MissingKey)));
    }

    #[tokio::test]
    async fn login_decode_failure_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(&["<Session><Key>"]));
        let err = QrzClient::with_transport(credentials(), Arc::clone(&transport))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn lookup_with_live_session_makes_one_request() {
        let (client, transport) =
            client_with(&[&session("abc"), &record("W1AW", "abc")]).await;

        let result = client.callsign_lookup("w1aw").await.unwrap();
        assert_eq!(result.call, "W1AW");
        assert_eq!(result.email.as_deref(), Some("w1aw@example.com"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(param(&requests[1], "callsign"), Some("W1AW"));
        assert_eq!(param(&requests[1], "s"), Some("abc"));
        assert_eq!(param(&requests[1], "password"), None);
        assert_eq!(client.session_key().unwrap().as_str(), "abc");
    }

    #[tokio::test]
    async fn expired_session_logs_in_and_retries_once() {
        let (client, transport) = client_with(&[
            &session("old"),
            &expired(Some("Session Timeout")),
            &session("new"),
            &record("W1AW", "new"),
        ])
        .await;

        let result = client.callsign_lookup("W1AW").await.unwrap();
        assert_eq!(result.call, "W1AW");

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(param(&requests[1], "s"), Some("old"));
        assert_eq!(param(&requests[2], "username"), Some("N0CALL"));
        assert_eq!(param(&requests[3], "s"), Some("new"));
        assert_eq!(client.session_key().unwrap().as_str(), "new");
    }

    #[tokio::test]
    async fn second_expiry_is_terminal() {
        let (client, transport) = client_with(&[
            &session("old"),
            &expired(None),
            &session("new"),
            &expired(None),
        ])
        .await;

        let err = client.callsign_lookup("W1AW").await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn fault_on_retry_is_terminal() {
        let (client, transport) = client_with(&[
            &session("old"),
            &expired(None),
            &session("new"),
            &expired(Some("Invalid session key")),
        ])
        .await;

        let err = client.callsign_lookup("W1AW").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid session key");
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test]
    async fn failed_relogin_is_returned() {
        let (client, transport) = client_with(&[
            &session("old"),
            &expired(None),
            &expired(Some("Username/password incorrect")),
        ])
        .await;

        let err = client.callsign_lookup("W1AW").await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Rejected(_))));
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(client.session_key().unwrap().as_str(), "old");
    }

    #[tokio::test]
    async fn fault_with_live_session_is_not_retried() {
        let not_found = "<QRZDatabase><Session><Error>Not found: XX1XX</Error>\
                         <Key>abc</Key></Session></QRZDatabase>";
        let (client, transport) = client_with(&[&session("abc"), not_found]).await;

        let err = client.callsign_lookup("XX1XX").await.unwrap_err();
        assert!(matches!(err, Error::Fault(_)));
        assert_eq!(err.to_string(), "Not found: XX1XX");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn live_session_without_record_is_decode_error() {
        let (client, _) = client_with(&[&session("abc"), &session("abc")]).await;

        let err = client.callsign_lookup("W1AW").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::MissingElement { element: "Callsign" })
        ));
    }

    #[tokio::test]
    async fn invalid_callsign_makes_no_request() {
        let (client, transport) = client_with(&[&session("abc")]).await;

        let err = client.callsign_lookup("W1AW&s=x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn returns_record_for_alias() {
        let (client, _) = client_with(&[&session("abc"), &record("W1AW", "abc")]).await;

        let result = client.callsign_lookup("W1AW/4").await.unwrap();
        assert_eq!(result.call, "W1AW");
    }

    /// Transport that reports every session as expired until the Nth login,
    /// issuing a fresh key per login.
    struct RotatingTransport {
        logins: AtomicUsize,
        live_key: Mutex<String>,
        issued: Mutex<Vec<String>>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for RotatingTransport {
        async fn request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
            tokio::task::yield_now().await;

            if let Some((_, key)) = params.iter().find(|(k, _)| *k == "s") {
                self.seen.lock().unwrap().push(key.to_string());
                let live = self.live_key.lock().unwrap().clone();
                let body = if *key == live {
                    record("W1AW", key)
                } else {
                    expired(None)
                };
                return Ok(body.into_bytes());
            }

            let n = self.logins.fetch_add(1, Ordering::SeqCst);
            let key = format!("key-{n:04}-{}", "x".repeat(32));
            *self.live_key.lock().unwrap() = key.clone();
            self.issued.lock().unwrap().push(key.clone());
            Ok(session(&key).into_bytes())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_see_whole_keys() {
        let transport = Arc::new(RotatingTransport {
            logins: AtomicUsize::new(0),
            live_key: Mutex::new(String::new()),
            issued: Mutex::default(),
            seen: Mutex::default(),
        });
        let client = QrzClient::with_transport(credentials(), Arc::clone(&transport))
            .await
            .unwrap();

        // Invalidate the first session so every task races to log in again.
        *transport.live_key.lock().unwrap() = "revoked".to_string();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.callsign_lookup("W1AW").await })
            })
            .collect();

        for task in tasks {
            // A task may lose the race and find its fresh key replaced, which
            // is a terminal expiry; a torn key would show up below instead.
            match task.await.unwrap() {
                Ok(record) => assert_eq!(record.call, "W1AW"),
                Err(err) => assert!(matches!(err, Error::Auth(AuthError::SessionExpired))),
            }
        }

        let issued = transport.issued.lock().unwrap().clone();
        for key in transport.seen.lock().unwrap().iter() {
            assert!(issued.contains(key), "lookup used unknown key {key}");
        }
        let current = client.session_key().unwrap();
        assert!(issued.iter().any(|k| k == current.as_str()));
    }
}

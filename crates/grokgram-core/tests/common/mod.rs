#![allow(dead_code)]

use grokgram_core::{
    ChatId, Completion, CompletionProvider, CompletionRequest, GrokgramError, MessageId,
    MessageSender, OutgoingMessage, SendError,
};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

type SendPolicy = Box<dyn Fn(&OutgoingMessage) -> Result<(), SendError> + Send + Sync>;
type DeletePolicy = Box<dyn Fn(ChatId, MessageId) -> Result<(), SendError> + Send + Sync>;
type CompletionFn = Box<dyn Fn(&CompletionRequest) -> Result<Completion, GrokgramError> + Send + Sync>;

/// Sender that records every attempt and fails according to a policy.
pub struct MockSender {
    attempts: Mutex<Vec<OutgoingMessage>>,
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    policy: SendPolicy,
    delete_policy: DeletePolicy,
    next_id: AtomicI32,
}

impl MockSender {
    pub fn new() -> Self {
        Self::with_policy(|_| Ok(()))
    }

    pub fn with_policy(
        policy: impl Fn(&OutgoingMessage) -> Result<(), SendError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            policy: Box::new(policy),
            delete_policy: Box::new(|_, _| Ok(())),
            next_id: AtomicI32::new(1000),
        }
    }

    /// Decide the result of every delete; attempts are recorded either way.
    pub fn with_delete_policy(
        mut self,
        policy: impl Fn(ChatId, MessageId) -> Result<(), SendError> + Send + Sync + 'static,
    ) -> Self {
        self.delete_policy = Box::new(policy);
        self
    }

    /// Every send attempt, successful or not, in order.
    pub fn attempts(&self) -> Vec<OutgoingMessage> {
        self.attempts.lock().unwrap().clone()
    }

    /// Attempts addressed to one chat.
    pub fn attempts_to(&self, chat: ChatId) -> Vec<OutgoingMessage> {
        self.attempts()
            .into_iter()
            .filter(|m| m.chat == chat)
            .collect()
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessageSender for MockSender {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError> {
        let result = (self.policy)(&message);
        self.attempts.lock().unwrap().push(message);
        result.map(|_| MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), SendError> {
        self.deleted.lock().unwrap().push((chat, message));
        (self.delete_policy)(chat, message)
    }
}

/// Provider that records requests and answers from a closure.
pub struct MockProvider {
    requests: Mutex<Vec<CompletionRequest>>,
    respond: CompletionFn,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(Completion::Reply(text.clone())))
    }

    pub fn new(
        respond: impl Fn(&CompletionRequest) -> Result<Completion, GrokgramError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, GrokgramError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

pub fn is_html_parse_rejection(message: &OutgoingMessage) -> bool {
    message.text.contains("<ul>")
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
/// Returns the base url to point a client at.
pub fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
    });
    (format!("http://{addr}"), server)
}

/// Drain headers and the declared body so the client never sees a reset.
fn read_request(stream: &mut impl Read) {
    let mut request = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).unwrap_or(0);
        if n == 0 {
            return;
        }
        request.extend_from_slice(&buf[..n]);

        let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
        let body_len = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= header_end + 4 + body_len {
            return;
        }
    }
}

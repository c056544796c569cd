#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;
use vidrelay::{
    Category, HttpReply, Instance, InstancePool, PoolDefinition, ProbeReply, Provider, Rejection,
    Relay, RelayConfig, Transport,
};

/// What the scripted transport answers for a URL prefix.
#[derive(Debug, Clone)]
pub enum Script {
    Reply { status: u16, body: String },
    Refuse,
    Delayed(Duration, Box<Script>),
}

impl Script {
    pub fn json(body: serde_json::Value) -> Self {
        Script::Reply {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Script::Reply {
            status,
            body: String::new(),
        }
    }

    pub fn raw(body: &str) -> Self {
        Script::Reply {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn after(self, delay: Duration) -> Self {
        Script::Delayed(delay, Box::new(self))
    }
}

/// List of a pool observed by the transport at request time.
struct Watch {
    pool: Arc<InstancePool>,
    provider: Provider,
    category: Category,
}

/// In-memory transport answering from longest-prefix scripts and recording
/// every URL it was asked for.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, Script)>>,
    probes: Mutex<Vec<(String, ProbeReply, Duration)>>,
    requests: Mutex<Vec<String>>,
    watch: Mutex<Option<Watch>>,
    orders: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, prefix: &str, script: Script) {
        self.routes.lock().push((prefix.to_string(), script));
    }

    pub fn probe_reply(&self, prefix: &str, status: u16, content_type: &str) {
        self.probe_reply_after(prefix, status, content_type, Duration::ZERO);
    }

    pub fn probe_reply_after(&self, prefix: &str, status: u16, content_type: &str, delay: Duration) {
        self.probes.lock().push((
            prefix.to_string(),
            ProbeReply {
                status,
                content_type: Some(content_type.to_string()),
            },
            delay,
        ));
    }

    /// Records the live `provider` list of `category` on every `get`.
    pub fn watch(&self, pool: &Arc<InstancePool>, provider: Provider, category: Category) {
        *self.watch.lock() = Some(Watch {
            pool: pool.clone(),
            provider,
            category,
        });
    }

    /// Orders seen by each `get` since `watch` was called.
    pub fn orders(&self) -> Vec<Vec<String>> {
        self.orders.lock().clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Requests whose URL starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }

    fn lookup(&self, url: &str) -> Option<Script> {
        self.routes
            .lock()
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, script)| script.clone())
    }
}

async fn play(script: Script, url: &Url) -> Result<HttpReply, Rejection> {
    let mut script = script;
    loop {
        match script {
            Script::Delayed(delay, next) => {
                tokio::time::sleep(delay).await;
                script = *next;
            }
            Script::Refuse => return Err(Rejection::transport(format!("{url}: connection refused"))),
            Script::Reply { status, body } => {
                return Ok(HttpReply {
                    status,
                    content_type: Some("application/json".to_string()),
                    body,
                });
            }
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url, _timeout: Duration) -> Result<HttpReply, Rejection> {
        self.requests.lock().push(url.to_string());
        if let Some(watch) = self.watch.lock().as_ref() {
            let order = names(&watch.pool.list(watch.provider, watch.category));
            self.orders.lock().push(order);
        }
        let script = self.lookup(url.as_str()).unwrap_or(Script::Refuse);
        play(script, url).await
    }

    async fn probe(&self, url: &Url, _timeout: Duration) -> Result<ProbeReply, Rejection> {
        self.requests.lock().push(url.to_string());
        let scripted = self
            .probes
            .lock()
            .iter()
            .find(|(prefix, _, _)| url.as_str().starts_with(prefix.as_str()))
            .map(|(_, reply, delay)| (reply.clone(), *delay));
        let (reply, delay) =
            scripted.ok_or_else(|| Rejection::transport(format!("{url}: connection refused")))?;
        tokio::time::sleep(delay).await;
        Ok(reply)
    }
}

pub fn instances(urls: &[&str]) -> Vec<Instance> {
    urls.iter().map(|u| Instance::parse(u).unwrap()).collect()
}

pub fn names(list: &[Instance]) -> Vec<String> {
    list.iter().map(|i| i.as_str().to_string()).collect()
}

/// Relay whose `category` has the given primary and secondary lists.
pub fn relay_with(
    transport: &Arc<ScriptedTransport>,
    category: Category,
    primary: &[&str],
    secondary: &[&str],
    config: RelayConfig,
) -> Relay {
    let pool = PoolDefinition::builder()
        .primary(category, instances(primary))
        .secondary(category, instances(secondary))
        .build();
    let config = RelayConfig {
        pool: Some(pool),
        ..config
    };
    let transport: Arc<dyn Transport> = transport.clone();
    Relay::with_transport(config, transport).unwrap()
}

pub fn live(relay: &Relay, provider: Provider, category: Category) -> Vec<String> {
    names(&relay.pool().list(provider, category))
}

pub fn video_payload(title: &str, media_url: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "author": "Uploader",
        "lengthSeconds": 212,
        "formatStreams": [
            {"url": media_url, "container": "mp4", "qualityLabel": "360p", "type": "video/mp4"}
        ]
    })
}

pub fn comments_payload(contents: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "comments": contents
            .iter()
            .map(|c| serde_json::json!({"author": "someone", "content": c}))
            .collect::<Vec<_>>()
    })
}

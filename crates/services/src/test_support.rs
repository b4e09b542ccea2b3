use std::sync::Arc;

use paper_core::model::{
    ChatConfig, Checklist, ChecklistId, ChecklistItem, ItemId, Stage, StageId, Topic, TopicId,
};
use storage::{ConfigRepository, InMemoryRepository};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) const PROPOSAL: StageId = StageId::new(1);
pub(crate) const MIDTERM: StageId = StageId::new(2);
pub(crate) const DEFENSE: StageId = StageId::new(4);

/// Two weighted items (0.3, 0.7) in checklist 100.
pub(crate) const TOPIC_SELECTION: TopicId = TopicId::new(10);
/// One item (0.5) in checklist 110.
pub(crate) const METHOD_DESIGN: TopicId = TopicId::new(11);
/// One item (1.0) in checklist 200.
pub(crate) const EXPERIMENTS: TopicId = TopicId::new(20);
/// No checklists at all.
pub(crate) const REHEARSAL: TopicId = TopicId::new(40);

pub(crate) const SYSTEM_PROMPT: &str = "你是研究生导师助手";

pub(crate) fn repo() -> Arc<dyn ConfigRepository> {
    let stages = vec![
        Stage::new(PROPOSAL, "开题阶段"),
        Stage::new(MIDTERM, "中期阶段"),
        Stage::new(DEFENSE, "答辩阶段"),
    ];
    let topics = vec![
        Topic::new(TOPIC_SELECTION, PROPOSAL, "选题"),
        Topic::new(METHOD_DESIGN, PROPOSAL, "研究方案设计"),
        Topic::new(EXPERIMENTS, MIDTERM, "研究进展"),
        Topic::new(REHEARSAL, DEFENSE, "模拟答辩"),
    ];
    let checklists = vec![
        Checklist::new(ChecklistId::new(100), TOPIC_SELECTION, "文献调研")
            .with_item(ChecklistItem::new(ItemId::new(1), "阅读核心文献", 0.3))
            .with_item(ChecklistItem::new(ItemId::new(2), "明确研究空缺", 0.7)),
        Checklist::new(ChecklistId::new(110), METHOD_DESIGN, "方法")
            .with_item(ChecklistItem::new(ItemId::new(1), "确定研究方法", 0.5)),
        Checklist::new(ChecklistId::new(200), EXPERIMENTS, "实验")
            .with_item(ChecklistItem::new(ItemId::new(1), "平台搭建完毕", 1.0)),
    ];
    let chat_config = ChatConfig {
        system_prompt: SYSTEM_PROMPT.to_owned(),
        ..ChatConfig::default()
    };
    Arc::new(
        InMemoryRepository::from_records(stages, topics, checklists)
            .expect("fixture catalog is consistent")
            .with_chat_config(chat_config),
    )
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Answers one HTTP request on a loopback port with `status` and a JSON
/// `body`, then closes. Returns the endpoint URL.
pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/v1/chat/completions")
}

/// Accepts one request and never answers it.
pub(crate) async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        std::future::pending::<()>().await;
        drop(socket);
    });
    format!("http://{addr}/v1/chat/completions")
}

/// An endpoint on a port nothing listens on.
pub(crate) async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/chat/completions")
}

async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

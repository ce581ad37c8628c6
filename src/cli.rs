//! 交互式命令行：逐行读取用户输入，逐轮交给编排器
//!
//! 输入 quit（忽略大小写与首尾空白）或输入流结束时退出；空行重新提示。

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::Orchestrator;

pub const FAREWELL: &str = "Goodbye! Keep up the great work.";

/// 运行交互循环；只有 IO 错误会提前结束
pub async fn run_repl<R, W>(
    agent: &mut Orchestrator,
    speaker: &str,
    reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let greeting = format!("{speaker}: Hi! I'm your workout assistant. Type 'quit' to exit.\n");
    writer.write_all(greeting.as_bytes()).await?;

    loop {
        writer.write_all(b"You: ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::info!("input closed, exiting");
            writer.write_all(format!("\n{speaker}: {FAREWELL}\n").as_bytes()).await?;
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            writer.write_all(format!("{speaker}: {FAREWELL}\n").as_bytes()).await?;
            break;
        }

        let reply = agent.handle_turn(input).await;
        writer.write_all(format!("{speaker}: {reply}\n").as_bytes()).await?;
    }

    writer.flush().await
}

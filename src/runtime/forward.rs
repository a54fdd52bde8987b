//! 按行转发输入流

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::producer::LogSender;

/// 逐行读取 `reader` 并发送，直到 EOF
///
/// 非 UTF-8 字节替换为 U+FFFD 后照常发送，行尾的 `\n` / `\r\n` 会被去掉。
/// 返回发送的行数；读取出错时立即返回错误
pub async fn forward_lines<R, S>(reader: &mut R, sender: &S) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin + ?Sized,
    S: LogSender + ?Sized,
{
    let mut buf = Vec::new();
    let mut forwarded = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            debug!(forwarded, "Input stream reached EOF");
            return Ok(forwarded);
        }

        let line = String::from_utf8_lossy(strip_line_ending(&buf));
        sender.send(&line).await;
        forwarded += 1;
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

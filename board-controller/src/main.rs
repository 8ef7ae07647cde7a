use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_controller::{
    BoardSession, ChessRules, ControllerConfig, MoveError, MoveValidator,
};
use board_protocol::{CommandLink, ProtocolError, SerialConnector, Square};

/// 机器人棋盘控制台
#[derive(Parser, Debug)]
#[command(name = "board-controller", version, about)]
struct Args {
    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 串口设备，覆盖配置文件
    #[arg(long)]
    port: Option<String>,

    /// 波特率，覆盖配置文件
    #[arg(long)]
    baud: Option<u32>,

    /// 等待应答超时（毫秒），覆盖配置文件
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 从指定局面开始
    #[arg(long)]
    fen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ControllerConfig::load_from(path),
        None => ControllerConfig::load(),
    };
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.serial.response_timeout_ms = timeout_ms;
    }

    // 初始化日志
    let level = config.log_level.as_str();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("board_controller={level}").parse()?)
                .add_directive(format!("board_protocol={level}").parse()?),
        )
        .init();

    info!("机器人棋盘控制器启动中...");

    let rules = match &args.fen {
        Some(fen) => ChessRules::from_fen(fen)?,
        None => ChessRules::new(),
    };
    let link = SerialConnector::open(&config.serial)
        .with_context(|| format!("无法打开串口 {}", config.serial.port))?;

    let mut session = BoardSession::new(rules, link);
    run_console(&mut session).await
}

/// 交互循环：每行一条命令，其余输入按走法处理
async fn run_console<V: MoveValidator, L: CommandLink>(
    session: &mut BoardSession<V, L>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt(session.rules().turn())?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["fen"] => println!("{}", session.rules().fen()),
            ["pos"] => report_query(session.read_position().await)?,
            ["angle"] => report_query(session.read_angles().await)?,
            ["goto", label] => match label.parse::<Square>() {
                Ok(square) => {
                    let result = session.move_to_square(square).await;
                    report_query(result.map(|_| Vec::new()))?
                }
                Err(e) => println!("{e}"),
            },
            _ => match session.play(line).await {
                Ok(played) => println!(
                    "{} 完成（{} 条命令）",
                    played.result.san,
                    played.commands.len()
                ),
                Err(MoveError::Rejected(e)) => println!("走法无效: {e}"),
                Err(MoveError::Actuation(e)) => {
                    println!("执行失败: {e}");
                    println!("棋局已记录该步，请手动复位实体棋盘");
                    if e.source.is_channel_error() {
                        bail!("串口通信中断: {}", e.source);
                    }
                }
            },
        }

        for message in session.messages() {
            println!("[{}] {}", message.received_at.format("%H:%M:%S"), message.text);
        }
        prompt(session.rules().turn())?;
    }

    info!("控制器退出");
    Ok(())
}

fn report_query(result: std::result::Result<Vec<u8>, ProtocolError>) -> Result<()> {
    match result {
        Ok(payload) if payload.is_empty() => println!("OK"),
        Ok(payload) => println!("{:?}", payload),
        Err(e) if e.is_channel_error() => bail!("串口通信中断: {e}"),
        Err(e) => println!("命令失败: {e}"),
    }
    Ok(())
}

fn prompt(turn: board_protocol::Color) -> std::io::Result<()> {
    print!("{turn} > ");
    std::io::stdout().flush()
}

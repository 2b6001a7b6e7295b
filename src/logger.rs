use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// 默认的日志过滤规则
pub const DEFAULT_LOG_FILTER: &str = "info,kar_lyric=trace";

/// 初始化 tracing 日志输出。
///
/// 优先使用 `RUST_LOG` 环境变量，未设置时回退到 `default_filter`。
/// 重复调用是安全的，已初始化时直接忽略。
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

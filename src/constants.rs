pub const TICK_RATE_MS: u64 = 1000; // 每秒取一次心率
pub const FETCH_TIMEOUT_SECS: u64 = 10;

// 心率采样频率很低，窗口不需要更大
pub const MAX_WINDOW_WIDTH: i64 = 10_000;

pub const CC_MIN: i32 = 0;
pub const CC_MAX: i32 = 127;
// 触发型 CC 消息固定发送最大值
pub const TRIGGER_CC_VALUE: u8 = 127;

pub const DEFAULT_CONFIG_PATH: &str = "pulse_midi.toml";
pub const DEFAULT_TOKEN_ENV: &str = "PULSOID_TOKEN";
pub const PULSOID_API_URL: &str =
    "https://dev.pulsoid.net/api/v1/data/heart_rate/latest?scope=data:heart_rate:read";
pub const MIDI_CLIENT_NAME: &str = "pulse_midi";

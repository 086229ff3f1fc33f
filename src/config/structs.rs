use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 访问去重模式
///
/// - `BestEffort`：先查询再插入，并发下可能重复计数
/// - `Strict`：同样先查询，再写入 fingerprint 并依赖唯一索引，冲突时忽略
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DedupMode {
    #[default]
    BestEffort,
    Strict,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - routes: 路由前缀
/// - api: Admin API 令牌
/// - tracking: 访问追踪中间件
/// - analytics: 统计缓存与 GeoIP
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：OC，分隔符：__
    /// 示例：OC__SERVER__PORT=9000
    pub fn load(path: Option<&str>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[ERROR] {}", e.format_simple());
                Self::default()
            }
        }
    }

    /// 同 [`StaticConfig::load`]，但不回退到默认值
    pub fn try_load(path: Option<&str>) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("OC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("tracking.excluded_paths")
                    .with_list_parse_key("tracking.excluded_prefixes")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                crate::errors::OvencraftError::config_load(format!(
                    "Failed to build config from '{}': {}",
                    path, e
                ))
            })?;

        let config = settings.try_deserialize::<StaticConfig>().map_err(|e| {
            crate::errors::OvencraftError::config_load(format!(
                "Failed to deserialize config from '{}': {}",
                path, e
            ))
        })?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::OvencraftError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 连接/获取超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// text | json
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 路由前缀配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
}

/// Admin API 配置
///
/// `admin_token` 为空时 Admin API 整体不可用（返回 404）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub admin_token: String,
}

/// 访问追踪配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracking_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub dedup_mode: DedupMode,
    /// 会话 Cookie 名称
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// 精确匹配跳过的路径
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
    /// 前缀匹配跳过的路径
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
}

impl TrackingConfig {
    /// 判断某个路径是否需要记录
    pub fn should_track(&self, path: &str) -> bool {
        if !self.enabled {
            return false;
        }

        if self.excluded_paths.iter().any(|p| p == path) {
            return false;
        }

        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
    }
}

/// 统计查询配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    /// Dashboard 快照缓存时间（秒），0 表示不缓存
    #[serde(default)]
    pub stats_cache_ttl_secs: u64,

    /// MaxMindDB 文件路径 (GeoLite2-City.mmdb)
    /// 未配置或不可读时不做地理位置解析
    #[serde(default)]
    pub maxminddb_path: Option<String>,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "ovencraft.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

fn default_tracking_enabled() -> bool {
    true
}

fn default_session_cookie() -> String {
    "sessionid".to_string()
}

fn default_excluded_paths() -> Vec<String> {
    ["/health", "/favicon.ico", "/robots.txt"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_excluded_prefixes() -> Vec<String> {
    ["/admin", "/static", "/media", "/health"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            admin_prefix: default_admin_prefix(),
            health_prefix: default_health_prefix(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracking_enabled(),
            dedup_mode: DedupMode::default(),
            session_cookie: default_session_cookie(),
            excluded_paths: default_excluded_paths(),
            excluded_prefixes: default_excluded_prefixes(),
        }
    }
}

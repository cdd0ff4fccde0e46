use std::path::PathBuf;

use super::parsing::{
    env_optional, env_or_default, normalize_prefix, parse_bool, parse_cors_origins,
    parse_environment, parse_storage_backend, parse_temperature, parse_u32, parse_u64,
};
use super::types::{
    AiSettings, ApiSettings, ConfigError, CorsSettings, ExamSettings, RuntimeSettings,
    ServerHost, ServerPort, ServerSettings, Settings, StorageBackendKind, StorageSettings,
    TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("DASMOCK_HOST", "0.0.0.0");
        let port = env_or_default("DASMOCK_PORT", "8000");

        let environment =
            parse_environment(env_optional("DASMOCK_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("DASMOCK_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "DasMock Exams API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let prefix = normalize_prefix(env_or_default("API_PREFIX", "/api"));

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let backend = parse_storage_backend(env_or_default("STORAGE_BACKEND", "file"))?;
        let data_dir = PathBuf::from(env_or_default("DATA_DIR", "data"));

        let openai_api_key = env_or_default("OPENAI_API_KEY", "");
        let openai_base_url = env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
        let marking_model = env_or_default("AI_MARKING_MODEL", "gpt-4");
        let generation_model = env_or_default("AI_GENERATION_MODEL", "gpt-3.5-turbo");
        let marking_temperature = parse_temperature(
            "AI_MARKING_TEMPERATURE",
            env_or_default("AI_MARKING_TEMPERATURE", "0.5"),
        )?;
        let generation_temperature = parse_temperature(
            "AI_GENERATION_TEMPERATURE",
            env_or_default("AI_GENERATION_TEMPERATURE", "0.6"),
        )?;
        let max_tokens = parse_u32("AI_MAX_TOKENS", env_or_default("AI_MAX_TOKENS", "4000"))?;
        let request_timeout =
            parse_u64("AI_REQUEST_TIMEOUT", env_or_default("AI_REQUEST_TIMEOUT", "120"))?;

        let examiner_id = env_or_default("EXAMINER_ID", "examiner_1");
        let default_duration_minutes = parse_u32(
            "DEFAULT_EXAM_DURATION_MINUTES",
            env_or_default("DEFAULT_EXAM_DURATION_MINUTES", "120"),
        )?;

        let log_level = env_or_default("DASMOCK_LOG_LEVEL", "info");
        let json = env_optional("DASMOCK_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, prefix },
            cors: CorsSettings { origins: cors_origins },
            storage: StorageSettings { backend, data_dir },
            ai: AiSettings {
                openai_api_key,
                openai_base_url,
                marking_model,
                generation_model,
                marking_temperature,
                generation_temperature,
                max_tokens,
                request_timeout,
            },
            exam: ExamSettings { examiner_id, default_duration_minutes },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn ai(&self) -> &AiSettings {
        &self.ai
    }

    pub(crate) fn exam(&self) -> &ExamSettings {
        &self.exam
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exam.examiner_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "EXAMINER_ID",
                value: String::from("<empty>"),
            });
        }

        if self.exam.default_duration_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DEFAULT_EXAM_DURATION_MINUTES",
                value: "0".to_string(),
            });
        }

        if self.ai.request_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "AI_REQUEST_TIMEOUT",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !self.ai.is_configured() {
            return Err(ConfigError::MissingSecret("OPENAI_API_KEY"));
        }
        if self.storage.backend != StorageBackendKind::File {
            return Err(ConfigError::InvalidValue {
                field: "STORAGE_BACKEND",
                value: "memory".to_string(),
            });
        }

        Ok(())
    }
}

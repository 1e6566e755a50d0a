use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for Civica.
///
/// Loaded from `~/.civica/config.toml` by default. The `[knowledge]` table is
/// optional; when it is empty the assistant uses its built-in facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CivicaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Category identifier (e.g. `status_inquiry`) to ordered facts.
    #[serde(default)]
    pub knowledge: BTreeMap<String, Vec<String>>,
}

impl CivicaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CivicaConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversational assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Whether the assistant widget may be opened.
    pub enabled: bool,
    /// Simulated "thinking" time before a reply is composed.
    pub thinking_delay_ms: u64,
    /// How long the error banner stays visible after a failed turn.
    pub error_grace_ms: u64,
    /// Maximum number of ranked facts a reply draws from.
    pub max_facts: usize,
    /// Greeting shown when a session opens with an empty history.
    pub welcome_message: String,
    /// Assistant message appended when a turn fails.
    pub apology_message: String,
    /// Transient banner text shown while `last_error` is set.
    pub error_banner: String,
    /// Descriptive system text handed to every session as display context.
    pub domain_context: String,
}

impl AssistantConfig {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    pub fn error_grace(&self) -> Duration {
        Duration::from_millis(self.error_grace_ms)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thinking_delay_ms: 1500,
            error_grace_ms: 3000,
            max_facts: 3,
            welcome_message: "¡Hola! Soy el Agente IA de la Junta Comunal. Puedo ayudarte con \
                información sobre solicitudes, procesos, documentos y más. \
                ¿En qué puedo asistirte hoy?"
                .to_string(),
            apology_message: "Lo siento, ha ocurrido un error al procesar tu consulta. \
                Por favor, intenta de nuevo con una pregunta diferente."
                .to_string(),
            error_banner: "Ha ocurrido un error al procesar tu consulta".to_string(),
            domain_context: DEFAULT_DOMAIN_CONTEXT.to_string(),
        }
    }
}

const DEFAULT_DOMAIN_CONTEXT: &str = "\
# Sistema de Gestión de Solicitudes de la Junta Comunal

Gestiona solicitudes de ayuda social de los ciudadanos, desde la recepción \
inicial hasta la entrega de materiales o servicios.

## Estados de Solicitud
Pendiente, Verificado, Aprobado, En Entrega, Completado, Rechazado.

## Módulos
Recepción, Trabajo Social, Almacén, Administración, Reportes.
";

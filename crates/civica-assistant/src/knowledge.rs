//! Static knowledge base: intent category to ordered facts.
//!
//! Built once at process start and shared read-only between sessions.
//! Lookups never fail: a category without facts answers with the
//! `general` facts instead.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::types::IntentCategory;

/// Immutable mapping from category to its ordered facts.
///
/// Index 0 of each list is the category's canonical fact.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    facts: HashMap<IntentCategory, Vec<String>>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase {
    /// Build a knowledge base from explicit entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (IntentCategory, Vec<String>)>,
    {
        Self {
            facts: entries.into_iter().collect(),
        }
    }

    /// The facts shipped with the assistant.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_FACTS.iter().map(|(category, facts)| {
            (*category, facts.iter().map(|f| f.to_string()).collect())
        }))
    }

    /// Overlay a configuration `[knowledge]` table on the built-in facts.
    ///
    /// Each recognised key replaces that category's list. Keys that name no
    /// category are skipped.
    pub fn from_config(table: &BTreeMap<String, Vec<String>>) -> Self {
        let mut kb = Self::builtin();
        for (key, facts) in table {
            match key.parse::<IntentCategory>() {
                Ok(category) => {
                    debug!(category = %category, count = facts.len(), "Knowledge override loaded");
                    kb.facts.insert(category, facts.clone());
                }
                Err(e) => warn!(key = %key, error = %e, "Ignoring knowledge entry"),
            }
        }
        kb
    }

    /// Ordered facts for `category`, or the `general` facts when the
    /// category has none.
    pub fn facts_for(&self, category: IntentCategory) -> &[String] {
        match self.facts.get(&category) {
            Some(facts) if !facts.is_empty() => facts,
            _ => {
                debug!(category = %category, "No facts for category, using general");
                self.general()
            }
        }
    }

    /// Like [`facts_for`](Self::facts_for) but keyed by identifier; an
    /// unrecognised key yields the `general` facts.
    pub fn facts_for_key(&self, key: &str) -> &[String] {
        match key.parse::<IntentCategory>() {
            Ok(category) => self.facts_for(category),
            Err(_) => {
                debug!(key = %key, "Unknown category key, using general");
                self.general()
            }
        }
    }

    /// Total number of facts across all categories.
    pub fn len(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn general(&self) -> &[String] {
        self.facts
            .get(&IntentCategory::General)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

static BUILTIN_FACTS: &[(IntentCategory, &[&str])] = &[
    (
        IntentCategory::StatusInquiry,
        &[
            "El estado de una solicitud puede ser: Pendiente, Verificado, Aprobado, En Entrega o Completado.",
            "Para verificar el estado, ve a la sección 'Solicitudes' y usa el buscador con el número o DNI.",
            "Cada cambio de estado genera una entrada en el historial de la solicitud para seguimiento.",
            "Las solicitudes con estado 'Pendiente' están esperando verificación de Trabajo Social.",
        ],
    ),
    (
        IntentCategory::Documents,
        &[
            "Los documentos requeridos incluyen: cédula de identidad, comprobante de domicilio, y documentos específicos según el tipo de solicitud.",
            "Los documentos se pueden visualizar en la pestaña 'Documentos' de cada solicitud.",
            "Es posible descargar los documentos desde la interfaz de detalles de la solicitud.",
            "Los documentos deben estar en formato PDF o imágenes (JPG, PNG).",
        ],
    ),
    (
        IntentCategory::Process,
        &[
            "El flujo completo del proceso es: Recepción > Trabajo Social > Aprobación > Almacén > Entrega.",
            "Cada solicitud debe pasar por verificación antes de ser aprobada.",
            "El sistema permite dar seguimiento a cada paso del proceso.",
            "Las aprobaciones son gestionadas por diferentes departamentos según el tipo de solicitud.",
        ],
    ),
    (
        IntentCategory::Timing,
        &[
            "El tiempo promedio de procesamiento es de 7-10 días hábiles para solicitudes regulares.",
            "Las solicitudes urgentes pueden procesarse en 3-5 días hábiles.",
            "La verificación por Trabajo Social toma aproximadamente 2-3 días.",
            "La entrega de materiales puede tardar 1-2 días adicionales después de la aprobación.",
        ],
    ),
    (
        IntentCategory::Materials,
        &[
            "Los materiales se asignan según el tipo de solicitud y necesidad verificada.",
            "El inventario de materiales se gestiona desde el módulo de Almacén.",
            "Se puede solicitar un kit estándar o materiales específicos según el caso.",
            "La entrega de materiales requiere verificación previa de disponibilidad.",
        ],
    ),
    (
        IntentCategory::SocialWorkVisit,
        &[
            "Trabajo Social realiza visitas para verificar las condiciones y necesidades reales.",
            "Las visitas se programan dentro de los 5 días hábiles siguientes a la solicitud.",
            "El informe de Trabajo Social es determinante para la aprobación.",
            "Se puede reprogramar una visita si el ciudadano no se encuentra disponible.",
        ],
    ),
    (
        IntentCategory::General,
        &[
            "El sistema gestiona el proceso completo desde la solicitud hasta la entrega.",
            "Puedes consultar el estado de solicitudes, programar visitas y gestionar la entrega de materiales.",
            "El historial permite ver todos los cambios y acciones realizadas en cada solicitud.",
            "Los reportes proporcionan estadísticas sobre solicitudes, aprobaciones y entregas.",
        ],
    ),
];

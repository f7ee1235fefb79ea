use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::id::{ElementId, IdGenerator, RandomIds};
use crate::validation::{extract, validate, AttributeSpec, Attributes, TypeDescriptor};
use crate::value::{Value, ValueKind};

/// Dependencies used when constructing elements: where time and identifiers
/// come from, and which construction rules apply.
#[derive(Debug, Clone)]
pub struct ElementContext {
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub config: ModelConfig,
}

impl ElementContext {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, config: ModelConfig) -> Self {
        Self { clock, ids, config }
    }

    /// Wall clock, random UUIDs, default config.
    pub fn system() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(RandomIds),
            ModelConfig::default(),
        )
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for ElementContext {
    fn default() -> Self {
        Self::system()
    }
}

/// Identity and timestamp bookkeeping shared by every model element.
///
/// `id` and `created` are fixed at construction. `modified`, when present,
/// is never earlier than `created`.
#[derive(Debug, Clone, Serialize)]
pub struct BaseElement {
    id: ElementId,
    created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
    #[serde(skip)]
    clock: Arc<dyn Clock>,
}

impl BaseElement {
    /// Create an element stamped with the context clock's current time.
    pub fn new(ctx: &ElementContext) -> Self {
        let element = Self {
            id: ctx.ids.generate(),
            created: ctx.clock.now(),
            modified: None,
            clock: Arc::clone(&ctx.clock),
        };
        trace!(id = %element.id, "element created");
        element
    }

    /// Create an element with explicit timestamps. A missing `created`
    /// defaults to the context clock's current time.
    pub fn from_parts(
        ctx: &ElementContext,
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Self, ModelError> {
        let now = ctx.clock.now();
        let created = created.unwrap_or(now);

        if ctx.config.reject_future_creation {
            // An unrepresentable limit places no bound on `created`.
            let limit = Duration::try_milliseconds(ctx.config.future_tolerance_ms.max(0))
                .and_then(|tolerance| now.checked_add_signed(tolerance));
            if limit.is_some_and(|limit| created > limit) {
                debug!(%created, %now, "rejected future creation time");
                return Err(ModelError::InvariantViolation(format!(
                    "'created' ({}) is later than the current time ({})",
                    created, now
                )));
            }
        }
        check_order(created, modified)?;

        let element = Self {
            id: ctx.ids.generate(),
            created,
            modified,
            clock: Arc::clone(&ctx.clock),
        };
        trace!(id = %element.id, "element created");
        Ok(element)
    }

    /// Create an element from dynamically typed timestamp inputs. Each must be
    /// a timestamp or [`Value::Null`].
    pub fn with_timestamps(
        ctx: &ElementContext,
        created: Value,
        modified: Value,
    ) -> Result<Self, ModelError> {
        let declared = optional_timestamp();
        validate("created", &created, declared)?;
        validate("modified", &modified, declared)?;
        let created = extract("created", created, declared)?;
        let modified = extract("modified", modified, declared)?;
        Self::from_parts(ctx, created, modified)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Set or clear the modification time.
    pub fn set_modified(&mut self, modified: Option<DateTime<Utc>>) -> Result<(), ModelError> {
        check_order(self.created, modified)?;
        self.modified = modified;
        Ok(())
    }

    /// Record a modification at the clock's current time, clamped so it never
    /// precedes `created`.
    pub fn touch(&mut self) {
        let now = self.clock.now().max(self.created);
        self.modified = Some(now);
        trace!(id = %self.id, modified = %now, "element modified");
    }

    /// Rebuild a stored element. The restored element stamps later
    /// modifications from the system clock.
    pub(crate) fn restore(
        id: ElementId,
        created: DateTime<Utc>,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Self, ModelError> {
        check_order(created, modified)?;
        Ok(Self {
            id,
            created,
            modified,
            clock: Arc::new(SystemClock),
        })
    }

    pub(crate) fn base_schema() -> &'static [AttributeSpec] {
        static SCHEMA: OnceLock<Vec<AttributeSpec>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            vec![
                AttributeSpec::new("id", TypeDescriptor::exact(ValueKind::Text)),
                AttributeSpec::new("created", TypeDescriptor::exact(ValueKind::Timestamp)),
                AttributeSpec::new("modified", optional_timestamp().clone()),
            ]
        })
    }
}

fn optional_timestamp() -> &'static TypeDescriptor {
    static DESCRIPTOR: OnceLock<TypeDescriptor> = OnceLock::new();
    DESCRIPTOR
        .get_or_init(|| TypeDescriptor::optional(TypeDescriptor::exact(ValueKind::Timestamp)))
}

fn check_order(
    created: DateTime<Utc>,
    modified: Option<DateTime<Utc>>,
) -> Result<(), ModelError> {
    match modified {
        Some(modified) if modified < created => {
            debug!(%created, %modified, "rejected modification before creation");
            Err(ModelError::InvariantViolation(format!(
                "'modified' ({}) must not be earlier than 'created' ({})",
                modified, created
            )))
        }
        _ => Ok(()),
    }
}

impl Attributes for BaseElement {
    fn element_name(&self) -> &'static str {
        "BaseElement"
    }

    fn schema(&self) -> &'static [AttributeSpec] {
        BaseElement::base_schema()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Text(self.id.to_string())),
            "created" => Some(Value::Timestamp(self.created)),
            "modified" => Some(self.modified.into()),
            _ => None,
        }
    }

    fn write_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        match name {
            "id" | "created" => Err(ModelError::InvariantViolation(format!(
                "attribute '{}' is read-only",
                name
            ))),
            "modified" => {
                let modified = extract(name, value, optional_timestamp())?;
                self.set_modified(modified)
            }
            _ => Err(ModelError::undeclared(name, "BaseElement")),
        }
    }
}

impl PartialEq for BaseElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BaseElement {}

impl std::hash::Hash for BaseElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BaseElementRecord {
    id: ElementId,
    created: DateTime<Utc>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for BaseElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = BaseElementRecord::deserialize(deserializer)?;
        Self::restore(record.id, record.created, record.modified)
            .map_err(serde::de::Error::custom)
    }
}

//! Action invocation builder.
//!
//! One builder instance drives one logical action call from intent to a
//! signed execute transaction ([`ActionBuilder::build_tx`]) or a view
//! call message ([`ActionBuilder::build_msg`]). Configuration methods
//! consume the builder; input mutation goes through a shared slot guarded
//! against reentrant use while a build is in flight.

use crate::auth::{challenge_and_sign, sign_with_challenge};
use crate::builder::{assemble_signed_tx, ActionInput};
use crate::cache::TtlCache;
use crate::codec::{encode_call, encode_execute_bytes, encode_param};
use crate::error::{KwilLinkError, Result};
use crate::models::{
    ActionDefinition, ActionPayload, DataType, EncodedValue, ParamValue, PayloadType,
    SchemaDescriptor, VarType,
};
use crate::numeric::{analyze_number, NumericMeta};
use crate::signer::{SignatureType, Signer};
use crate::transport::NodeProvider;
use crate::tx::{Message, Transaction};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// The builder's pending-inputs slot.
///
/// `Building` makes concurrent mutation fail fast; the pre-build rows are
/// restored by [`BuildGuard`] on every exit path.
enum InputState {
    Idle(Vec<ActionInput>),
    Building,
}

/// Scope guard over the inputs slot: acquiring it flips the slot to
/// `Building`, dropping it restores the saved rows whether the build
/// settled in success or error.
struct BuildGuard<'a> {
    slot: &'a Mutex<InputState>,
    rows: Option<Vec<ActionInput>>,
}

impl<'a> BuildGuard<'a> {
    fn acquire(slot: &'a Mutex<InputState>) -> Result<Self> {
        let mut state = slot.lock().expect("inputs lock poisoned");
        match &mut *state {
            InputState::Building => Err(KwilLinkError::BuildInProgress),
            InputState::Idle(rows) => {
                let rows = std::mem::take(rows);
                *state = InputState::Building;
                Ok(Self {
                    slot,
                    rows: Some(rows),
                })
            }
        }
    }

    fn rows(&self) -> &[ActionInput] {
        self.rows.as_deref().unwrap_or(&[])
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if let Some(rows) = self.rows.take() {
            if let Ok(mut state) = self.slot.lock() {
                *state = InputState::Idle(rows);
            }
        }
    }
}

/// Builder for action invocations against a deployed schema.
///
/// # Examples
///
/// ```rust,no_run
/// use kwil_link::{ActionInput, KwilLinkClient, Signer};
///
/// # async fn example(signer: Signer) -> kwil_link::Result<()> {
/// let client = KwilLinkClient::builder()
///     .base_url("http://localhost:8484")
///     .chain_id("kwil-chain-1")
///     .build()?;
///
/// let builder = client
///     .action()
///     .dbid("xf617af1ca774ebbd6d23e8fe12c56d41d25a22d81e88f67c6c6ee0d4")
///     .name("add_post")
///     .signer(signer)
///     .description("add a post");
/// builder.concat(
///     ActionInput::new()
///         .put("$id", "123e4567-e89b-12d3-a456-426614174000")
///         .put("$user", "Luke"),
/// )?;
///
/// let tx = builder.build_tx().await?;
/// client.broadcast(&tx).await?;
/// # Ok(())
/// # }
/// ```
pub struct ActionBuilder {
    provider: Arc<dyn NodeProvider>,
    schema_cache: Arc<TtlCache<SchemaDescriptor>>,
    chain_id: String,
    dbid: Option<String>,
    action: Option<String>,
    signer: Option<Signer>,
    signature_type: Option<SignatureType>,
    description: String,
    nonce: Option<u64>,
    challenge: Option<String>,
    inputs: Mutex<InputState>,
}

impl std::fmt::Debug for ActionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBuilder")
            .field("chain_id", &self.chain_id)
            .field("dbid", &self.dbid)
            .field("action", &self.action)
            .field("signer", &self.signer)
            .field("signature_type", &self.signature_type)
            .field("description", &self.description)
            .field("nonce", &self.nonce)
            .field("challenge", &self.challenge)
            .finish_non_exhaustive()
    }
}

impl ActionBuilder {
    pub(crate) fn new(
        provider: Arc<dyn NodeProvider>,
        schema_cache: Arc<TtlCache<SchemaDescriptor>>,
        chain_id: String,
    ) -> Self {
        Self {
            provider,
            schema_cache,
            chain_id,
            dbid: None,
            action: None,
            signer: None,
            signature_type: None,
            description: String::new(),
            nonce: None,
            challenge: None,
            inputs: Mutex::new(InputState::Idle(Vec::new())),
        }
    }

    /// Target namespace / database id.
    pub fn dbid(mut self, dbid: impl Into<String>) -> Self {
        self.dbid = Some(dbid.into());
        self
    }

    /// Alias for [`ActionBuilder::dbid`].
    pub fn namespace(self, namespace: impl Into<String>) -> Self {
        self.dbid(namespace)
    }

    /// Action name; lowercased to match the node's procedure names.
    pub fn name(mut self, action: &str) -> Self {
        self.action = Some(action.to_ascii_lowercase());
        self
    }

    /// Signing capability used for the final signature.
    pub fn signer(mut self, signer: Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Explicit signature type; overrides inference from the signer.
    pub fn signature_type(mut self, signature_type: SignatureType) -> Self {
        self.signature_type = Some(signature_type);
        self
    }

    /// Human-readable description embedded in the signed message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Pin the transaction nonce instead of resolving it from the
    /// account.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Pin a private-mode challenge (hex) instead of fetching one during
    /// `build_msg`.
    pub fn challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// Append one input row.
    ///
    /// Fails immediately with [`KwilLinkError::BuildInProgress`] while a
    /// build is in flight on this instance.
    pub fn concat(&self, input: ActionInput) -> Result<&Self> {
        let mut state = self.inputs.lock().expect("inputs lock poisoned");
        match &mut *state {
            InputState::Building => Err(KwilLinkError::BuildInProgress),
            InputState::Idle(rows) => {
                rows.push(input);
                Ok(self)
            }
        }
    }

    /// Append several input rows at once.
    pub fn concat_rows(&self, inputs: Vec<ActionInput>) -> Result<&Self> {
        let mut state = self.inputs.lock().expect("inputs lock poisoned");
        match &mut *state {
            InputState::Building => Err(KwilLinkError::BuildInProgress),
            InputState::Idle(rows) => {
                rows.extend(inputs);
                Ok(self)
            }
        }
    }

    /// Snapshot of the pending input rows.
    pub fn pending_inputs(&self) -> Result<Vec<ActionInput>> {
        match &*self.inputs.lock().expect("inputs lock poisoned") {
            InputState::Building => Err(KwilLinkError::BuildInProgress),
            InputState::Idle(rows) => Ok(rows.clone()),
        }
    }

    async fn resolve_schema(&self, dbid: &str) -> Result<SchemaDescriptor> {
        if let Some(schema) = self.schema_cache.get(dbid) {
            debug!("[SCHEMA_CACHE] hit dbid={}", dbid);
            return Ok(schema);
        }
        debug!("[SCHEMA_CACHE] miss dbid={}, fetching", dbid);
        // Populated only on a successful fetch; failures stay uncached.
        let schema = self.provider.schema(dbid).await?;
        self.schema_cache.set(dbid, schema.clone());
        Ok(schema)
    }

    /// Build a signed execute transaction.
    pub async fn build_tx(&self) -> Result<Transaction> {
        let dbid = required(&self.dbid, "dbid")?.to_string();
        let action_name = required(&self.action, "action name")?.to_string();
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| KwilLinkError::Precondition("signer is required".to_string()))?;
        let signature_type = signer.resolve_type(self.signature_type);

        let guard = BuildGuard::acquire(&self.inputs)?;
        debug!("[BUILD_TX] start dbid={} action={}", dbid, action_name);

        let schema = self.resolve_schema(&dbid).await?;
        let action = lookup_action(&schema, &dbid, &action_name)?;
        check_public(action)?;
        if action.is_view() {
            return Err(KwilLinkError::SchemaError(format!(
                "view action '{}' cannot be used with the execute path; build a call message instead",
                action_name
            )));
        }

        validate_inputs(action, guard.rows())?;
        let rows = encode_rows(action, guard.rows())?;
        let payload = ActionPayload::new(dbid, action_name, rows);
        let payload_bytes = encode_execute_bytes(&payload)?;

        assemble_signed_tx(
            self.provider.as_ref(),
            &self.chain_id,
            &payload_bytes,
            PayloadType::Execute,
            &self.description,
            self.nonce,
            signer,
            signature_type,
        )
        .await
    }

    /// Build a view call message.
    ///
    /// With a signer, the message is signed under the private-mode
    /// challenge protocol (a pinned challenge is consumed, otherwise one
    /// is fetched); without a signer the message goes out unsigned.
    pub async fn build_msg(&self) -> Result<Message> {
        let dbid = required(&self.dbid, "dbid")?.to_string();
        let action_name = required(&self.action, "action name")?.to_string();

        let guard = BuildGuard::acquire(&self.inputs)?;
        if guard.rows().len() > 1 {
            return Err(KwilLinkError::Precondition(format!(
                "a call message carries at most one input row, got {}",
                guard.rows().len()
            )));
        }
        debug!("[BUILD_MSG] start dbid={} action={}", dbid, action_name);

        let schema = self.resolve_schema(&dbid).await?;
        let action = lookup_action(&schema, &dbid, &action_name)?;
        check_public(action)?;
        if !action.is_view() {
            return Err(KwilLinkError::SchemaError(format!(
                "action '{}' is state-changing and cannot be used with the call path; build an execute transaction instead",
                action_name
            )));
        }

        validate_inputs(action, guard.rows())?;
        let rows = encode_rows(action, guard.rows())?;
        let payload = ActionPayload::new(dbid, action_name, rows);
        let payload_b64 = encode_call(&payload)?;

        match &self.signer {
            Some(signer) => {
                let signed = match &self.challenge {
                    Some(challenge) => sign_with_challenge(&payload, signer, challenge).await?,
                    None => challenge_and_sign(self.provider.as_ref(), &payload, signer).await?,
                };
                Ok(Message::signed(
                    payload_b64,
                    signed.challenge,
                    signed.signature,
                    signer.identifier_hex(),
                ))
            }
            None => Ok(Message::unsigned(payload_b64, None)),
        }
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| KwilLinkError::Precondition(format!("{} is required", name)))
}

fn lookup_action<'a>(
    schema: &'a SchemaDescriptor,
    dbid: &str,
    name: &str,
) -> Result<&'a ActionDefinition> {
    if schema.actions.is_empty() {
        return Err(KwilLinkError::SchemaError(format!(
            "namespace '{}' declares no actions",
            dbid
        )));
    }
    schema.action(name).ok_or_else(|| {
        KwilLinkError::SchemaError(format!("action '{}' not found in namespace '{}'", name, dbid))
    })
}

fn check_public(action: &ActionDefinition) -> Result<()> {
    if !action.is_public() {
        return Err(KwilLinkError::SchemaError(format!(
            "action '{}' is not public",
            action.name
        )));
    }
    Ok(())
}

/// Validate caller rows against the schema-declared parameters.
///
/// Missing names, extra names, and type mismatches are accumulated across
/// all rows so the error names every offending parameter at once.
fn validate_inputs(action: &ActionDefinition, rows: &[ActionInput]) -> Result<()> {
    if action.parameters.is_empty() {
        if rows.iter().any(|row| !row.is_empty()) {
            return Err(KwilLinkError::InputValidation(format!(
                "action '{}' declares no parameters but inputs were supplied",
                action.name
            )));
        }
        return Ok(());
    }

    if rows.is_empty() || rows.iter().all(ActionInput::is_empty) {
        return Err(KwilLinkError::InputValidation(format!(
            "action '{}' requires {} parameter(s) but no inputs were supplied",
            action.name,
            action.parameters.len()
        )));
    }

    let declared: BTreeSet<&str> = action.parameters.iter().map(|p| p.name.as_str()).collect();
    let mut missing: BTreeSet<&str> = BTreeSet::new();
    let mut extra: BTreeSet<String> = BTreeSet::new();
    let mut mistyped: BTreeMap<&str, String> = BTreeMap::new();

    for row in rows {
        let provided: BTreeSet<&str> = row.names().collect();
        missing.extend(declared.difference(&provided).copied());
        extra.extend(provided.difference(&declared).map(|s| s.to_string()));

        for parameter in &action.parameters {
            let Some(value) = row.get(&parameter.name) else {
                continue;
            };
            let declared_type = DataType::parse(&parameter.param_type)?;
            if let Err(reason) = check_value(&declared_type, value) {
                mistyped.entry(parameter.name.as_str()).or_insert(reason);
            }
        }
    }

    if missing.is_empty() && extra.is_empty() && mistyped.is_empty() {
        return Ok(());
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "missing parameters: {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    if !extra.is_empty() {
        parts.push(format!(
            "extra parameters: {}",
            extra.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    for (name, reason) in mistyped {
        parts.push(format!("{}: {}", name, reason));
    }

    Err(KwilLinkError::InputValidation(format!(
        "action '{}': {}",
        action.name,
        parts.join("; ")
    )))
}

/// Check one value against its declared type: shape, member type, and
/// numeric precision/scale bounds.
fn check_value(declared: &DataType, value: &ParamValue) -> std::result::Result<(), String> {
    if matches!(value, ParamValue::Null) {
        return Ok(());
    }

    let members: Vec<&ParamValue> = match value {
        ParamValue::Array(items) => {
            if !declared.is_array {
                return Err(format!("expected a {} scalar, got an array", declared.name.as_str()));
            }
            items.iter().collect()
        }
        scalar => {
            if declared.is_array {
                return Err(format!("expected a {} array, got a scalar", declared.name.as_str()));
            }
            vec![scalar]
        }
    };

    for member in members {
        if matches!(member, ParamValue::Null) {
            continue;
        }
        if !conforms(declared.name, member) {
            return Err(format!("expected type {}", declared.name.as_str()));
        }
        if let Some(meta) = declared.numeric_meta() {
            check_numeric_fit(&meta, member)?;
        }
    }

    Ok(())
}

fn conforms(declared: VarType, value: &ParamValue) -> bool {
    match declared {
        VarType::Null => true,
        VarType::Text => matches!(value, ParamValue::Text(_)),
        VarType::Int => matches!(value, ParamValue::Int(_)),
        VarType::Bool => matches!(value, ParamValue::Bool(_)),
        VarType::Blob => matches!(value, ParamValue::Blob(_)),
        VarType::Uuid => match value {
            ParamValue::Uuid(_) => true,
            ParamValue::Text(s) => uuid::Uuid::try_parse(s).is_ok(),
            _ => false,
        },
        VarType::Numeric => value.numeric_repr().is_some(),
    }
}

fn check_numeric_fit(meta: &NumericMeta, value: &ParamValue) -> std::result::Result<(), String> {
    let repr = value
        .numeric_repr()
        .ok_or_else(|| format!("expected a numeric value within numeric({},{})", meta.precision, meta.scale))?;
    let analyzed = analyze_number(&repr).map_err(|e| e.to_string())?;
    if analyzed.scale > meta.scale || analyzed.integer_digits() > meta.integer_digits() {
        return Err(format!(
            "value '{}' does not fit numeric({},{})",
            repr, meta.precision, meta.scale
        ));
    }
    Ok(())
}

/// Encode validated rows with schema-declared types.
///
/// Numeric parameters with declared metadata keep it; bare numerics take
/// the analyzer's output for the caller's actual value (arrays: the first
/// element, matching the node's own inference).
fn encode_rows(action: &ActionDefinition, rows: &[ActionInput]) -> Result<Vec<Vec<EncodedValue>>> {
    if action.parameters.is_empty() {
        // The action still executes once per row; with no caller rows it
        // executes exactly once.
        let count = rows.len().max(1);
        return Ok(vec![Vec::new(); count]);
    }

    let mut encoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut columns = Vec::with_capacity(action.parameters.len());
        for parameter in &action.parameters {
            let value = row.get(&parameter.name).ok_or_else(|| {
                KwilLinkError::InputValidation(format!("missing parameter {}", parameter.name))
            })?;
            let declared = DataType::parse(&parameter.param_type)?;
            let resolved = resolve_metadata(&declared, value)?;
            columns.push(encode_param(value, &resolved)?);
        }
        encoded.push(columns);
    }
    Ok(encoded)
}

fn resolve_metadata(declared: &DataType, value: &ParamValue) -> Result<DataType> {
    if declared.name != VarType::Numeric || declared.metadata.is_some() {
        return Ok(declared.clone());
    }

    let repr = match value {
        ParamValue::Array(items) => items.first().and_then(ParamValue::numeric_repr),
        scalar => scalar.numeric_repr(),
    };

    match repr {
        Some(repr) => Ok(DataType::numeric(analyze_number(&repr)?, declared.is_array)),
        // A null numeric has nothing to analyze; the descriptor stays
        // metadata-free.
        None => Ok(declared.clone()),
    }
}

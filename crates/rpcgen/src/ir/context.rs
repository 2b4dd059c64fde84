//! Per-call-site generation context and the per-run generation session.

use std::collections::{HashMap, HashSet};

use super::{IrOptions, ModelDecl, ModelId, ModelKind, ModelRef, ModelShape, TypeRef};
use crate::codegen::naming::pascal_case;
use crate::diagnostic::GeneratorError;
use crate::schema::{AppDefinition, Metadata, Schema};

/// Where in the document a schema node sits.
///
/// Contexts are cheap to clone and are narrowed for every child node; they
/// never carry state shared between sibling calls.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    /// Slash-delimited structural location, used to derive type names.
    pub instance_path: String,
    /// Location in the definition document, used in diagnostics.
    pub schema_path: String,
    pub type_prefix: String,
    /// The node sits in an optional-properties slot.
    pub is_optional: bool,
    pub discriminator_key: Option<String>,
    pub discriminator_value: Option<String>,
    pub root_service: String,
}

impl GenerationContext {
    pub fn new(options: &IrOptions) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            type_prefix: options.type_prefix.clone(),
            is_optional: false,
            discriminator_key: None,
            discriminator_value: None,
            root_service: options.root_service.clone(),
        }
    }

    /// Context for the top-level definition `name`.
    pub fn definition(&self, name: &str) -> Self {
        Self {
            instance_path: format!("/{}", name),
            schema_path: format!("/definitions/{}", name),
            is_optional: false,
            discriminator_key: None,
            discriminator_value: None,
            ..self.clone()
        }
    }

    /// Context for a property of the current object.
    pub fn property(&self, key: &str, optional: bool) -> Self {
        let slot = if optional {
            "optionalProperties"
        } else {
            "properties"
        };
        let schema_path = match &self.discriminator_value {
            Some(tag) => format!("{}/mapping/{}/{}/{}", self.schema_path, tag, slot, key),
            None => format!("{}/{}/{}", self.schema_path, slot, key),
        };
        Self {
            instance_path: format!("{}/{}", self.instance_path, key),
            schema_path,
            is_optional: optional,
            discriminator_key: None,
            discriminator_value: None,
            ..self.clone()
        }
    }

    /// Context for the elements of an array.
    pub fn element(&self) -> Self {
        Self {
            instance_path: format!("{}/[element]", self.instance_path),
            schema_path: format!("{}/elements", self.schema_path),
            is_optional: false,
            discriminator_key: None,
            discriminator_value: None,
            ..self.clone()
        }
    }

    /// Context for the values of a record.
    pub fn value(&self) -> Self {
        Self {
            instance_path: format!("{}/[value]", self.instance_path),
            schema_path: format!("{}/values", self.schema_path),
            is_optional: false,
            discriminator_key: None,
            discriminator_value: None,
            ..self.clone()
        }
    }

    /// Context for one branch of a discriminated union. The schema path stays
    /// on the union; [`Self::property`] adds the mapping segment.
    pub fn variant(&self, discriminator: &str, tag: &str) -> Self {
        Self {
            instance_path: format!("{}/{}", self.instance_path, tag),
            schema_path: self.schema_path.clone(),
            is_optional: false,
            discriminator_key: Some(discriminator.to_string()),
            discriminator_value: Some(tag.to_string()),
            ..self.clone()
        }
    }

    /// Type name for a node: the explicit id if there is one, else the
    /// instance path. Always carries the prefix.
    pub fn type_name(&self, metadata: &Metadata) -> String {
        let base = match &metadata.id {
            Some(id) => pascal_case(id),
            None => pascal_case(&self.instance_path),
        };
        format!("{}{}", self.type_prefix, base)
    }

    /// Deduplication key for a node.
    pub fn identity(&self, metadata: &Metadata) -> String {
        match &metadata.id {
            Some(id) => id.clone(),
            None => self.instance_path.clone(),
        }
    }
}

/// Mutable state shared by every call of one generation run.
///
/// Models live in an arena indexed by [`ModelId`]. A model is registered
/// before its children are resolved, so a child that reaches it again sees
/// it on the under-construction stack and stores it boxed.
pub struct GenerationSession<'a> {
    app: &'a AppDefinition,
    models: Vec<ModelDecl>,
    identities: HashMap<String, ModelId>,
    names: HashMap<String, ModelId>,
    reserved: HashSet<String>,
    under_construction: Vec<ModelId>,
    /// Non-model definitions being inlined, with the construction depth at
    /// which they were entered.
    aliases: Vec<(String, usize)>,
}

impl<'a> GenerationSession<'a> {
    pub fn new(app: &'a AppDefinition) -> Self {
        Self {
            app,
            models: Vec::new(),
            identities: HashMap::new(),
            names: HashMap::new(),
            reserved: HashSet::new(),
            under_construction: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn definition(&self, name: &str) -> Option<&'a Schema> {
        self.app.definitions.get(name)
    }

    /// Finds an already registered model by identity.
    pub fn lookup(&self, identity: &str) -> Option<ModelId> {
        self.identities.get(identity).copied()
    }

    /// Keeps `name` away from every model registered afterwards.
    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    /// Registers a pending model. A name already taken by a different
    /// identity gets a numeric suffix.
    pub fn register(
        &mut self,
        identity: String,
        name: String,
        shape: ModelShape,
        metadata: &Metadata,
        instance_path: &str,
    ) -> ModelId {
        let id = ModelId(self.models.len());
        let name = self.unique_name(name);

        self.identities.insert(identity, id);
        self.names.insert(name.clone(), id);
        self.models.push(ModelDecl {
            id,
            name,
            shape,
            description: metadata.description.clone(),
            is_deprecated: metadata.is_deprecated,
            instance_path: instance_path.to_string(),
            kind: ModelKind::Pending,
        });
        id
    }

    fn is_taken(&self, name: &str) -> bool {
        self.names.contains_key(name) || self.reserved.contains(name)
    }

    fn unique_name(&self, name: String) -> String {
        if !self.is_taken(&name) {
            return name;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", name, n);
            if !self.is_taken(&candidate) {
                tracing::debug!(name = %name, renamed = %candidate, "type name collision");
                return candidate;
            }
            n += 1;
        }
    }

    /// Marks a model as under construction.
    pub fn begin(&mut self, id: ModelId) {
        self.under_construction.push(id);
    }

    /// Fills in a model's body and takes it off the construction stack.
    pub fn finish(&mut self, id: ModelId, kind: ModelKind) {
        if let Some(pos) = self.under_construction.iter().rposition(|m| *m == id) {
            self.under_construction.remove(pos);
        }
        if let Some(model) = self.models.get_mut(id.0) {
            model.kind = kind;
        }
    }

    pub fn is_under_construction(&self, id: ModelId) -> bool {
        self.under_construction.contains(&id)
    }

    pub fn model(&self, id: ModelId) -> Option<&ModelDecl> {
        self.models.get(id.0)
    }

    /// A reference to a registered model, boxed if the model is still being
    /// built.
    pub fn model_ref(&self, id: ModelId) -> ModelRef {
        let (name, shape) = self
            .model(id)
            .map(|m| (m.name.clone(), m.shape))
            .unwrap_or_else(|| (String::new(), ModelShape::Object));
        ModelRef {
            id,
            name,
            shape,
            boxed: self.is_under_construction(id),
        }
    }

    /// Enters an inlined non-model definition, failing if it is already being
    /// inlined without a model in between.
    pub fn enter_alias(&mut self, name: &str) -> Result<(), GeneratorError> {
        let depth = self.under_construction.len();
        if self
            .aliases
            .iter()
            .any(|(alias, at)| alias == name && *at == depth)
        {
            return Err(GeneratorError::RecursiveAlias {
                name: name.to_string(),
            });
        }
        self.aliases.push((name.to_string(), depth));
        Ok(())
    }

    pub fn leave_alias(&mut self) {
        self.aliases.pop();
    }

    /// Registers a top-level non-model definition as a named alias.
    pub fn register_alias(
        &mut self,
        definition: &str,
        name: String,
        metadata: &Metadata,
        ty: TypeRef,
    ) -> ModelId {
        let id = self.register(
            format!("definition:{}", definition),
            name,
            ModelShape::Alias,
            metadata,
            &format!("/{}", definition),
        );
        self.finish(id, ModelKind::Alias(ty));
        id
    }

    pub fn into_models(self) -> Vec<ModelDecl> {
        self.models
    }
}

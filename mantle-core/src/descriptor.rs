use crate::{CoreError, Result, Value};
use std::any::type_name;

/// One column to field binding, carrying the generated accessor pair so SQL
/// assembly and materialization never introspect at runtime.
pub struct FieldBinding<E> {
    /// Database column name; defaults to the field name.
    pub column: &'static str,
    /// Field name on the entity type, also used as the placeholder name.
    pub field: &'static str,
    /// Type prototype of the declared field (a `Value` variant with `None`).
    pub value: Value,
    pub id: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub transient: bool,
    pub get: fn(&E) -> Value,
    pub set: fn(&mut E, Value) -> Result<()>,
}

impl<E> FieldBinding<E> {
    pub fn new(
        field: &'static str,
        value: Value,
        get: fn(&E) -> Value,
        set: fn(&mut E, Value) -> Result<()>,
    ) -> Self {
        Self {
            column: field,
            field,
            value,
            id: false,
            insertable: true,
            updatable: true,
            transient: false,
            get,
            set,
        }
    }

    /// Explicit column name, when it differs from the field name.
    pub fn column(mut self, name: &'static str) -> Self {
        self.column = name;
        self
    }

    /// Marks this binding as the primary key. Exactly one per entity.
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Excludes the field from every generated statement and from
    /// materialization.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

/// Generates the accessor pair of a [`FieldBinding`] for an ordinary named
/// field. The declared Rust type drives the prototype and the conversion on
/// assignment.
#[macro_export]
macro_rules! field_binding {
    ($entity:ty, $field:ident: $type:ty) => {
        $crate::FieldBinding::<$entity>::new(
            stringify!($field),
            <$type as $crate::AsValue>::as_empty_value(),
            |e: &$entity| $crate::AsValue::as_value(e.$field.clone()),
            |e: &mut $entity, v: $crate::Value| -> $crate::Result<()> {
                e.$field = $crate::AsValue::try_from_value(v)?;
                Ok(())
            },
        )
    };
}

/// Explicit, statically declared schema of one entity type; turned into a
/// frozen [`EntityDescriptor`] on first use.
pub struct Schema<E> {
    pub(crate) table: Option<&'static str>,
    pub(crate) constructor: fn() -> E,
    pub(crate) fields: Vec<FieldBinding<E>>,
}

impl<E> Schema<E> {
    pub fn new(constructor: fn() -> E) -> Self {
        Self {
            table: None,
            constructor,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, name: &'static str) -> Self {
        self.table = Some(name);
        self
    }

    /// Merges field bindings contributed by a shared base declaration.
    /// Declare the base before the type's own fields so they keep the
    /// superclass-first ordering.
    pub fn base(mut self, fields: impl IntoIterator<Item = FieldBinding<E>>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn field(mut self, binding: FieldBinding<E>) -> Self {
        self.fields.push(binding);
        self
    }
}

/// Frozen per-type metadata: table name, id binding, ordered column
/// bindings and the constructor used during materialization. Built once,
/// cached for the process lifetime, never mutated afterwards.
pub struct EntityDescriptor<E> {
    table: String,
    constructor: fn() -> E,
    fields: Box<[FieldBinding<E>]>,
    id: usize,
}

impl<E> EntityDescriptor<E> {
    pub(crate) fn build(schema: Schema<E>) -> Result<Self> {
        let table = match schema.table {
            Some(name) => name.to_owned(),
            None => {
                let fallback = simple_type_name::<E>();
                log::warn!(
                    "Entity `{}` declares no table name, using `{}`",
                    type_name::<E>(),
                    fallback
                );
                fallback.to_owned()
            }
        };
        let mut ids = schema
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.id)
            .map(|(i, _)| i);
        let Some(id) = ids.next() else {
            return Err(CoreError::MissingId(type_name::<E>()).into());
        };
        if ids.next().is_some() {
            return Err(CoreError::AmbiguousId(type_name::<E>()).into());
        }
        Ok(Self {
            table,
            constructor: schema.constructor,
            fields: schema.fields.into_boxed_slice(),
            id,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn new_entity(&self) -> E {
        (self.constructor)()
    }

    pub fn fields(&self) -> &[FieldBinding<E>] {
        &self.fields
    }

    pub fn id_binding(&self) -> &FieldBinding<E> {
        &self.fields[self.id]
    }

    /// Columns emitted in insert column/value lists. The id column is never
    /// part of them, generated keys flow back through the execution layer.
    pub fn insert_bindings(&self) -> impl Iterator<Item = &FieldBinding<E>> {
        self.fields
            .iter()
            .filter(|f| !f.id && !f.transient && f.insertable)
    }

    /// Columns eligible for an update SET list, before the runtime
    /// null/empty skipping applied at assembly time.
    pub fn update_bindings(&self) -> impl Iterator<Item = &FieldBinding<E>> {
        self.fields
            .iter()
            .filter(|f| !f.id && !f.transient && f.updatable)
    }

    /// Columns read back during materialization: the id plus every
    /// non-transient binding.
    pub fn mapped_bindings(&self) -> impl Iterator<Item = &FieldBinding<E>> {
        self.fields.iter().filter(|f| f.id || !f.transient)
    }
}

pub(crate) fn simple_type_name<E>() -> &'static str {
    let full = type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

use crate::{
    ColumnInfo, Cursor, NameMapper, Result, Row, RowNames, SqlError, SqlRecord,
    name_map::MapperKey,
};
use log::debug;
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    marker::PhantomData,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// What to do with a result column that resolves to no field on the target
/// record. The default is to fail; [`MappingPolicy::SkipUnmapped`] silently
/// drops the column from the plan instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingPolicy {
    #[default]
    Fail,
    SkipUnmapped,
}

/// Compiled column -> field resolution for one (target type, result shape,
/// mapper) combination. Applying it per row never re-consults the mapper or
/// the field list.
#[derive(Debug)]
struct BeanPlan {
    /// Per column index: the receiving field, or `None` for a skipped column.
    fields: Box<[Option<&'static str>]>,
}

/// Identity of one cached plan. The full column layout (labels and type
/// codes, in order) is the shape identity, never a digest of it, so two
/// different layouts can never alias a plan.
#[derive(PartialEq, Eq, Hash)]
struct PlanKey {
    target: TypeId,
    columns: Arc<[ColumnInfo]>,
    mapper: MapperKey,
    skip_unmapped: bool,
}

static BEAN_PLANS: LazyLock<RwLock<HashMap<PlanKey, Arc<BeanPlan>>>> =
    LazyLock::new(Default::default);
static MAP_PLANS: LazyLock<RwLock<HashMap<(Arc<[ColumnInfo]>, Option<MapperKey>), RowNames>>> =
    LazyLock::new(Default::default);

fn compile_bean_plan<R: SqlRecord + 'static>(
    columns: &[ColumnInfo],
    mapper: &NameMapper,
    policy: MappingPolicy,
) -> Result<Arc<BeanPlan>> {
    let key = PlanKey {
        target: TypeId::of::<R>(),
        columns: columns.into(),
        mapper: mapper.cache_key(),
        skip_unmapped: policy == MappingPolicy::SkipUnmapped,
    };
    if let Some(plan) = BEAN_PLANS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(plan.clone());
    }
    let mut fields = Vec::with_capacity(columns.len());
    for column in columns {
        let ident = mapper.map(&column.label);
        match R::fields().iter().find(|f| **f == ident) {
            Some(field) => fields.push(Some(*field)),
            None if policy == MappingPolicy::SkipUnmapped => fields.push(None),
            None => {
                return Err(SqlError::UnmappedColumn {
                    column: column.label.clone(),
                    field: ident,
                    target: type_name::<R>(),
                }
                .into());
            }
        }
    }
    debug!(
        "Compiled conversion plan for {} over {} column(s)",
        type_name::<R>(),
        columns.len()
    );
    let plan = Arc::new(BeanPlan {
        fields: fields.into_boxed_slice(),
    });
    BEAN_PLANS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, plan.clone());
    Ok(plan)
}

fn compile_map_plan(columns: &[ColumnInfo], mapper: Option<&NameMapper>) -> RowNames {
    let key = (
        Arc::<[ColumnInfo]>::from(columns),
        mapper.map(NameMapper::cache_key),
    );
    if let Some(labels) = MAP_PLANS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return labels.clone();
    }
    // Without a mapper the raw labels pass through untouched.
    let labels: RowNames = columns
        .iter()
        .map(|c| match mapper {
            Some(mapper) => mapper.map(&c.label),
            None => c.label.clone(),
        })
        .collect();
    MAP_PLANS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, labels.clone());
    labels
}

/// Materializes cursor rows into records of type `R`, one per advance.
///
/// The conversion plan is resolved at construction (or taken from the
/// process-wide cache for an already-seen shape); `beanify` and friends only
/// apply it. The extractor borrows the cursor and holds no driver resources
/// of its own.
pub struct BeanExtractor<'c, R: SqlRecord + 'static, C: Cursor> {
    cursor: &'c mut C,
    plan: Arc<BeanPlan>,
    _target: PhantomData<R>,
}

impl<'c, R: SqlRecord + 'static, C: Cursor> std::fmt::Debug for BeanExtractor<'c, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanExtractor").finish_non_exhaustive()
    }
}

impl<'c, R: SqlRecord + 'static, C: Cursor> BeanExtractor<'c, R, C> {
    pub fn new(cursor: &'c mut C, mapper: &NameMapper, policy: MappingPolicy) -> Result<Self> {
        let plan = compile_bean_plan::<R>(cursor.columns(), mapper, policy)?;
        Ok(Self {
            cursor,
            plan,
            _target: PhantomData,
        })
    }

    /// Materialize the next row. `Ok(None)` is the explicit end-of-data
    /// signal; an empty result set yields it on the first call.
    pub fn beanify(&mut self) -> Result<Option<R>> {
        let Some(values) = self.cursor.next_row()? else {
            return Ok(None);
        };
        let mut record = R::empty();
        for (value, field) in values.into_iter().zip(self.plan.fields.iter()) {
            if let Some(field) = field {
                record.set_field(field, value)?;
            }
        }
        Ok(Some(record))
    }

    /// Materialize at most `limit` rows.
    pub fn beanify_at_most(&mut self, limit: usize) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while records.len() < limit {
            match self.beanify()? {
                Some(record) => records.push(record),
                None => break,
            }
        }
        Ok(records)
    }

    /// Materialize every remaining row.
    pub fn beanify_all(&mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(record) = self.beanify()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Materializes cursor rows into ordered string-keyed [`Row`]s.
///
/// Map mode is the identity plan: column order is preserved and the name
/// mapper, when supplied, is applied to the labels once at construction.
pub struct MapExtractor<'c, C: Cursor> {
    cursor: &'c mut C,
    labels: RowNames,
}

impl<'c, C: Cursor> MapExtractor<'c, C> {
    pub fn new(cursor: &'c mut C, mapper: Option<&NameMapper>) -> Self {
        let labels = compile_map_plan(cursor.columns(), mapper);
        Self { cursor, labels }
    }

    /// Materialize the next row; `Ok(None)` once exhausted.
    pub fn mappify(&mut self) -> Result<Option<Row>> {
        let Some(values) = self.cursor.next_row()? else {
            return Ok(None);
        };
        Ok(Some(Row::from_parts(self.labels.clone(), values)))
    }

    pub fn mappify_at_most(&mut self, limit: usize) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while rows.len() < limit {
            match self.mappify()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    pub fn mappify_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.mappify()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

mod common;

#[cfg(test)]
mod tests {
    use crate::common::{FakeConnection, FakeStatement};
    use bindery::{
        BindConfig, Connection, NameMapper, Params, ParamSource, Placeholder, SqlError, SqlRecord,
        SqlType, Value, bind_all, normalize,
    };
    use std::{collections::HashMap, sync::PoisonError};

    fn statement_for(conn: &mut FakeConnection, sql: &str) -> (bindery::SqlInfo, FakeStatement) {
        let info = normalize(sql, Placeholder::QuestionMark).unwrap();
        let stmt = conn.prepare(info.normalized()).unwrap();
        (info, stmt)
    }

    #[test]
    fn bind_fans_out_to_every_position() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) = statement_for(
            &mut conn,
            "SELECT * FROM t WHERE a = :other AND b = :id AND c = :x AND d = :y AND e = :id",
        );
        assert_eq!(info.positions("id"), Some(&[2, 5][..]));
        let mut source = HashMap::new();
        source.insert("other".to_owned(), Value::Int32(Some(1)));
        source.insert("id".to_owned(), Value::Int64(Some(42)));
        source.insert("x".to_owned(), Value::Int32(Some(2)));
        source.insert("y".to_owned(), Value::Int32(Some(3)));
        bind_all(&mut stmt, &info, &source, &bindery::DefaultBindConfig).unwrap();
        let journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
        let id_positions: Vec<u32> = journal
            .bound
            .iter()
            .filter(|(_, v, _)| *v == Value::Int64(Some(42)))
            .map(|(p, _, _)| *p)
            .collect();
        assert_eq!(id_positions, [2, 5]);
        assert_eq!(journal.bound.len(), 5);
    }

    #[test]
    fn missing_value_fails_before_any_bind() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) =
            statement_for(&mut conn, "UPDATE t SET a = :a, b = :b WHERE id = :id");
        let mut source = HashMap::new();
        source.insert("a".to_owned(), Value::Int32(Some(1)));
        source.insert("id".to_owned(), Value::Int32(Some(2)));
        let err = bind_all(&mut stmt, &info, &source, &bindery::DefaultBindConfig).unwrap_err();
        let Some(SqlError::UnboundParameter { parameter }) = err.downcast_ref::<SqlError>() else {
            panic!("expected UnboundParameter, got {err}");
        };
        assert_eq!(parameter, "b");
        // The statement must not have received a partial binding.
        assert!(journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bound
            .is_empty());
    }

    #[test]
    fn explicit_null_is_a_value() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) = statement_for(&mut conn, "UPDATE t SET a = :a");
        let mut source = HashMap::new();
        source.insert("a".to_owned(), Value::Varchar(None));
        bind_all(&mut stmt, &info, &source, &bindery::DefaultBindConfig).unwrap();
        let journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(journal.bound, [(1, Value::Varchar(None), SqlType::Varchar)]);
    }

    #[test]
    fn params_later_entries_win() {
        let params = Params::new().set("a", 1_i32).set("a", 2_i32);
        assert_eq!(params.value_of("a"), Some(Value::Int32(Some(2))));
        assert_eq!(params.value_of("b"), None);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default, bindery::SqlEnum)]
    enum Status {
        #[default]
        Pending,
        Active,
        Closed,
    }

    struct StatusAsText;
    impl BindConfig for StatusAsText {
        fn enum_as_string(&self, parameter: &str) -> bool {
            parameter == "status"
        }
    }

    #[test]
    fn enum_binds_as_ordinal_by_default() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) = statement_for(&mut conn, "UPDATE t SET status = :status");
        let mut source = HashMap::new();
        source.insert("status".to_owned(), Value::from(Status::Active));
        bind_all(&mut stmt, &info, &source, &bindery::DefaultBindConfig).unwrap();
        let journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(journal.bound, [(1, Value::Int32(Some(1)), SqlType::Integer)]);
    }

    #[test]
    fn enum_binds_as_label_when_configured() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) = statement_for(&mut conn, "UPDATE t SET status = :status");
        let mut source = HashMap::new();
        source.insert("status".to_owned(), Value::from(Status::Active));
        bind_all(&mut stmt, &info, &source, &StatusAsText).unwrap();
        let journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(
            journal.bound,
            [(
                1,
                Value::Varchar(Some("Active".to_owned())),
                SqlType::Varchar
            )]
        );
    }

    struct IdAsBigInt;
    impl BindConfig for IdAsBigInt {
        fn sql_type(&self, parameter: &str, _value: &Value) -> Option<SqlType> {
            (parameter == "id").then_some(SqlType::BigInt)
        }
    }

    #[test]
    fn sql_type_override() {
        let mut conn = FakeConnection::new();
        let journal = conn.journal();
        let (info, mut stmt) = statement_for(&mut conn, "DELETE FROM t WHERE id = :id");
        let mut source = HashMap::new();
        source.insert("id".to_owned(), Value::Int32(Some(7)));
        bind_all(&mut stmt, &info, &source, &IdAsBigInt).unwrap();
        let journal = journal.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(journal.bound, [(1, Value::Int32(Some(7)), SqlType::BigInt)]);
    }

    #[derive(Debug, Clone, Default, bindery::SqlRecord)]
    struct Person {
        id: Option<i64>,
        #[field_name("firstName")]
        first_name: String,
        #[field_name("lastName")]
        last_name: String,
    }

    #[test]
    fn record_source_with_mapper() {
        use bindery::RecordSource;
        let person = Person {
            id: Some(3),
            first_name: "John".to_owned(),
            last_name: "Smith".to_owned(),
        };
        // Parameters written in snake_case match camelCase record fields.
        let mapper = NameMapper::CamelToSnakeLower;
        let source = RecordSource::new(&person, &mapper);
        assert_eq!(
            source.value_of("first_name"),
            Some(Value::Varchar(Some("John".to_owned())))
        );
        assert_eq!(source.value_of("id"), Some(Value::Int64(Some(3))));
        assert_eq!(source.value_of("nope"), None);
    }

    #[test]
    fn record_fields_and_roundtrip() {
        assert_eq!(Person::fields(), ["id", "firstName", "lastName"]);
        let mut person = Person::empty();
        person
            .set_field("firstName", Value::Varchar(Some("Ada".to_owned())))
            .unwrap();
        person.set_field("id", Value::Int32(Some(9))).unwrap();
        assert_eq!(person.first_name, "Ada");
        assert_eq!(person.id, Some(9));
        assert_eq!(person.get_field("id"), Some(Value::Int64(Some(9))));
        assert!(person.set_field("unknown", Value::Null).is_err());
        assert_eq!(person.get_field("unknown"), None);
    }
}

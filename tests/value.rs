#[cfg(test)]
mod tests {
    use bindery::{AsValue, EnumValue, SqlType, Value};
    use rust_decimal::Decimal;
    use std::{borrow::Cow, str::FromStr};
    use time::{
        Date, Month, PrimitiveDateTime, Time,
        macros::{date, datetime, time},
    };
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert!(Value::Null.is_null());
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
    }

    #[test]
    fn value_bool() {
        let val: Value = true.as_value();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(None));
        assert_eq!(bool::try_from_value(val).unwrap(), true);
        assert_eq!(bool::try_from_value(1_i8.as_value()).unwrap(), true);
        assert_eq!(bool::try_from_value(0_i64.as_value()).unwrap(), false);
        assert_eq!(bool::try_from_value(9_u32.as_value()).unwrap(), true);
        assert_eq!(
            bool::try_from_value(Value::Varchar(Some("t".into()))).unwrap(),
            true
        );
        assert!(bool::try_from_value(0.5_f32.as_value()).is_err());
        assert_eq!(bool::parse("true").unwrap(), true);
        assert_eq!(bool::parse("false").unwrap(), false);
        assert!(bool::parse("false more").is_err());
        assert!(bool::parse("").is_err());
    }

    #[test]
    fn value_integer_widths() {
        let val = 127_i8.as_value();
        assert_eq!(val, Value::Int8(Some(127)));
        assert_eq!(i64::try_from_value(val).unwrap(), 127);
        assert_eq!(i8::try_from_value(127_i64.as_value()).unwrap(), 127);
        assert!(i8::try_from_value(128_i64.as_value()).is_err());
        assert!(u8::try_from_value((-1_i32).as_value()).is_err());
        assert_eq!(u16::try_from_value(65535_u32.as_value()).unwrap(), 65535);
        assert!(u64::try_from_value((-1_i8).as_value()).is_err());
    }

    #[test]
    fn value_integer_from_text() {
        assert_eq!(
            i32::try_from_value(Value::Varchar(Some("123".into()))).unwrap(),
            123
        );
        assert_eq!(
            i32::try_from_value(Value::Varchar(Some("-45".into()))).unwrap(),
            -45
        );
        assert!(i32::try_from_value(Value::Varchar(Some("123abc".into()))).is_err());
        assert!(i32::try_from_value(Value::Varchar(Some("".into()))).is_err());
        assert_eq!(i32::parse("42").unwrap(), 42);
        let mut input = "42 rest";
        assert_eq!(i32::extract(&mut input).unwrap(), 42);
        assert_eq!(input, " rest");
    }

    #[test]
    fn value_float() {
        let val = 1.5_f64.as_value();
        assert_eq!(val, Value::Float64(Some(1.5)));
        assert_eq!(f64::try_from_value(3_i32.as_value()).unwrap(), 3.0);
        assert_eq!(
            f32::try_from_value(Value::Varchar(Some("2.5".into()))).unwrap(),
            2.5
        );
        assert_eq!(
            f64::try_from_value(Decimal::from_str("0.25").unwrap().as_value()).unwrap(),
            0.25
        );
        assert!(f64::try_from_value(Value::Boolean(Some(true))).is_err());
    }

    #[test]
    fn value_decimal() {
        let d = Decimal::from_str("12.34").unwrap();
        assert_eq!(d.as_value(), Value::Decimal(Some(d)));
        assert_eq!(Decimal::try_from_value(d.as_value()).unwrap(), d);
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("12.34".into()))).unwrap(),
            d
        );
        assert_eq!(
            Decimal::try_from_value(1234_i64.as_value()).unwrap(),
            Decimal::from_str("1234").unwrap()
        );
    }

    #[test]
    fn value_string() {
        let val = "hello".to_owned().as_value();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(String::try_from_value(val).unwrap(), "hello");
        let label = Value::Enum(Some(EnumValue {
            ordinal: 2,
            label: Cow::Borrowed("ACTIVE"),
        }));
        assert_eq!(String::try_from_value(label).unwrap(), "ACTIVE");
        assert!(String::try_from_value(Value::Int32(Some(1))).is_err());
    }

    #[test]
    fn value_date_time() {
        let d = date!(2024 - 02 - 29);
        assert_eq!(d.as_value(), Value::Date(Some(d)));
        assert_eq!(
            Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            d
        );
        assert_eq!(
            Date::try_from_value(d.as_value()).unwrap().month(),
            Month::February
        );
        let t = time!(13:45:00);
        assert_eq!(
            Time::try_from_value(Value::Varchar(Some("13:45:00".into()))).unwrap(),
            t
        );
        let ts = datetime!(2024-02-29 13:45:00);
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29 13:45:00".into()
            )))
            .unwrap(),
            ts
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2024-02-29T13:45:00".into()
            )))
            .unwrap(),
            ts
        );
        // A date decodes from a timestamp by truncation.
        assert_eq!(Date::try_from_value(ts.as_value()).unwrap(), d);
        assert!(Date::try_from_value(Value::Varchar(Some("not a date".into()))).is_err());
    }

    #[test]
    fn value_uuid() {
        let u = Uuid::from_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(u.as_value(), Value::Uuid(Some(u)));
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(u.to_string()))).unwrap(),
            u
        );
        assert_eq!(String::try_from_value(u.as_value()).unwrap(), u.to_string());
    }

    #[test]
    fn value_blob() {
        let bytes = vec![1_u8, 2, 3];
        let val = bytes.clone().as_value();
        assert_eq!(val, Value::Blob(Some(vec![1, 2, 3].into_boxed_slice())));
        assert_eq!(Vec::<u8>::try_from_value(val).unwrap(), bytes);
    }

    #[test]
    fn value_option() {
        assert_eq!(Option::<i32>::as_empty_value(), Value::Int32(None));
        assert_eq!(Some(5_i32).as_value(), Value::Int32(Some(5)));
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(None)).unwrap(),
            None
        );
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(Some(5))).unwrap(),
            Some(5)
        );
        assert!(i32::try_from_value(Value::Int32(None)).is_err());
    }

    #[test]
    fn value_sql_type() {
        assert_eq!(Value::Boolean(Some(true)).sql_type(), SqlType::Boolean);
        assert_eq!(Value::Int64(None).sql_type(), SqlType::BigInt);
        assert_eq!(Value::Varchar(Some("x".into())).sql_type(), SqlType::Varchar);
        // Symbolic enums default to their ordinal representation.
        assert_eq!(Value::Enum(None).sql_type(), SqlType::Integer);
    }
}

//! `filter!` - declare a filter struct and its field table in one place

/// Declare a filter struct.
///
/// ```
/// qfilter::filter! {
///     #[derive(Debug, Default)]
///     pub struct UserQuery as "users" {
///         #[query = "type:like"]
///         pub name: String,
///         #[query = "type:gt"]
///         pub status: i32,
///     }
/// }
///
/// let query = UserQuery { name: "Bob".to_string(), status: 0 };
/// let condition = qfilter::compile(qfilter::Dialect::Postgres, &query).unwrap();
/// assert_eq!(condition.clauses.where_.len(), 1);
/// ```
///
/// `as "<table>"` is optional; without it the struct inherits the table of
/// the scope it is nested in. Fields without `#[query]` must hold another
/// filter struct (or an `Option` of one).
#[macro_export]
macro_rules! filter {
    (@table) => { "" };
    (@table $table:literal) => { $table };
    (@tag) => { ::std::option::Option::None };
    (@tag $tag:literal) => { ::std::option::Option::Some($tag) };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $table:literal)? {
            $(
                $(#[query = $tag:literal])?
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field: $fty, )*
        }

        impl $crate::Filter for $name {
            fn table_name(&self) -> &str {
                $crate::filter!(@table $($table)?)
            }

            fn fields(&self) -> ::std::vec::Vec<$crate::FilterField<'_>> {
                ::std::vec![
                    $(
                        $crate::FilterField::new(
                            ::std::stringify!($field),
                            $crate::filter!(@tag $($tag)?),
                            &self.$field,
                        ),
                    )*
                ]
            }
        }

        impl $crate::FieldSource for $name {
            fn is_zero(&self) -> bool {
                $crate::Filter::is_empty(self)
            }

            fn field_value(&self) -> $crate::FieldValue<'_> {
                $crate::FieldValue::Nested(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{compile, Dialect, Filter, SqlValue};

    filter! {
        #[derive(Debug, Default)]
        pub struct Paging {
            #[query = "type:order;column:id"]
            pub sort: String,
        }
    }

    filter! {
        #[derive(Debug, Default)]
        pub struct RoleQuery as "roles" {
            #[query = "type:eq;column:name"]
            pub role: String,
        }
    }

    filter! {
        #[derive(Debug, Default)]
        pub struct AccountQuery as "accounts" {
            #[query = "type:like"]
            pub name: String,
            #[query = "type:gt"]
            pub status: i32,
            #[query = "type:gte;column:created_at"]
            pub created_after: Option<chrono::NaiveDate>,
            #[query = "type:isnull;column:deleted_at"]
            pub live: bool,
            #[query = "type:eq;group:or"]
            pub owner_id: Option<i64>,
            #[query = "type:join;join:roles;on:account_id,id"]
            pub role: Option<RoleQuery>,
            pub paging: Paging,
            #[query = "-"]
            pub internal: String,
        }
    }

    filter! {
        #[derive(Debug, Default)]
        pub struct AddressQuery as "addresses" {
            #[query = "type:eq"]
            pub line1: String,
            #[query = "type:gt"]
            pub unit_id: u64,
            #[query = "type:order"]
            pub sort: String,
        }
    }

    #[test]
    fn test_digit_suffixed_fields_keep_their_column() {
        let query = AddressQuery {
            line1: "1 Main St".to_string(),
            unit_id: 12,
            sort: "order[address2]=desc".to_string(),
        };

        let condition = compile(Dialect::Postgres, &query).unwrap();
        let wheres: Vec<&str> = condition.clauses.where_.keys().map(String::as_str).collect();
        assert_eq!(wheres, vec!["addresses.line1 = ?", "addresses.unit_id > ?"]);
        assert_eq!(condition.clauses.where_["addresses.unit_id > ?"], vec![SqlValue::Int(12)]);
        assert_eq!(condition.clauses.order, vec!["addresses.address2 desc"]);
    }

    #[test]
    fn test_generated_field_table() {
        let query = AccountQuery::default();
        let fields = query.fields();

        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["name", "status", "created_after", "live", "owner_id", "role", "paging", "internal"]
        );
        assert_eq!(fields[0].tag, Some("type:like"));
        assert_eq!(fields[6].tag, None);
        assert_eq!(query.table_name(), "accounts");
        assert!(query.is_empty());
    }

    #[test]
    fn test_default_filter_emits_nothing() {
        let condition = compile(Dialect::Mysql, &AccountQuery::default()).unwrap();
        assert!(condition.is_empty());
    }

    #[test]
    fn test_macro_filter_compiles() {
        let query = AccountQuery {
            name: "Bob".to_string(),
            created_after: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
            live: true,
            owner_id: Some(0),
            role: Some(RoleQuery { role: "admin".to_string() }),
            paging: Paging { sort: "order[createdAt]=desc".to_string() },
            internal: "ignored".to_string(),
            ..Default::default()
        };

        let condition = compile(Dialect::Mysql, &query).unwrap();
        let wheres: Vec<&str> = condition.clauses.where_.keys().map(String::as_str).collect();
        assert_eq!(
            wheres,
            vec![
                "`accounts`.`name` like ?",
                "`accounts`.`created_at` >= ?",
                "`accounts`.`deleted_at` is null",
            ]
        );
        assert_eq!(condition.clauses.or["`accounts`.`owner_id` = ?"], vec![SqlValue::Int(0)]);
        assert_eq!(condition.clauses.order, vec!["`accounts`.`created_at` desc"]);

        assert_eq!(condition.joins.len(), 1);
        let join = &condition.joins[0];
        assert_eq!(
            join.on,
            "LEFT JOIN `roles` ON `roles`.`account_id` = `accounts`.`id`"
        );
        assert_eq!(
            join.condition.clauses.where_["`roles`.`name` = ?"],
            vec![SqlValue::from("admin")]
        );
    }
}

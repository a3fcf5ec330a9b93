use regex::Regex;
use sql_fluent::prelude::*;

const NAME: &str = "[a-z]{5}";

fn named(pattern: &str) -> Regex {
    Regex::new(&format!("^{}$", pattern.replace("NAME", NAME))).unwrap()
}

#[test]
fn from_with_alias_quotes_both_parts() -> Result<(), Box<dyn std::error::Error>> {
    for (table, alias, expected) in [
        ("orders", "o", "FROM `orders` `o`"),
        ("my`table", "t`1", "FROM `my``table` `t``1`"),
        ("orders", "", "FROM `orders`"),
    ] {
        let mut builder = StatementBuilder::new();
        builder.from_aliased(table, alias);
        let sql = builder.to_sql()?;
        assert!(sql.contains(expected), "{sql}");
    }
    Ok(())
}

#[test]
fn every_predicate_gets_a_fresh_name() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder.from("orders");
    for i in 0..50 {
        builder.and_where("id", "!=", i)?;
    }
    let built = builder.build()?;
    let mut names = built.params.names();
    assert_eq!(names.len(), 50);
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 50);

    let placeholder = Regex::new(&format!(":({NAME})"))?;
    let in_text: Vec<&str> = placeholder
        .captures_iter(&built.query)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    assert_eq!(in_text, built.params.names());
    for (i, value) in built.params.values().into_iter().enumerate() {
        assert_eq!(value, &RowValues::Int(i64::try_from(i)?));
    }
    Ok(())
}

#[test]
fn statement_type_accepts_any_case() {
    let mut builder = StatementBuilder::new();
    for kind in ["select", "INSERT", "Update", "dElEtE"] {
        assert!(builder.statement_type(kind).is_ok(), "{kind}");
    }
    assert_eq!(builder.statement_kind(), StatementKind::Delete);

    for bad in ["", "UPSERT", "select "] {
        let err = builder.statement_type(bad).unwrap_err();
        assert!(matches!(err, SqlFluentError::InvalidStatementKind { .. }));
        assert!(err.is_validation());
    }
    assert_eq!(builder.statement_kind(), StatementKind::Delete);
}

#[test]
fn single_row_insert_equals_one_row_batch() -> Result<(), Box<dyn std::error::Error>> {
    let mut single = StatementBuilder::new();
    single.from("t").set_insert([("a", 1), ("b", 2)])?;
    let mut batch = StatementBuilder::new();
    batch.from("t").set_insert(vec![vec![("a", 1), ("b", 2)]])?;

    let single = single.build()?;
    assert_eq!(single, batch.build()?);
    assert_eq!(single.query, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?)");
    assert_eq!(
        single.params,
        Bindings::Positional(vec![RowValues::Int(1), RowValues::Int(2)])
    );
    Ok(())
}

#[test]
fn batch_insert_binds_all_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder
        .from("t")
        .set_insert(vec![vec![("a", 1), ("b", 2)], vec![("a", 3), ("b", 4)]])?;
    let built = builder.build()?;
    assert_eq!(built.query, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?)");
    assert_eq!(
        built.params,
        Bindings::Positional((1..=4).map(RowValues::Int).collect())
    );
    Ok(())
}

#[test]
fn limit_and_offset_forms() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder.from("t").limit_offset(5, 0);
    assert_eq!(builder.to_sql()?, "SELECT * FROM `t` LIMIT 5");
    builder.limit_offset(5, 10);
    assert_eq!(builder.to_sql()?, "SELECT * FROM `t` LIMIT 10, 5");
    Ok(())
}

#[test]
fn orders_scenario_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder.from("orders").and_where("product_id", "=", 1)?;
    let re = named(r"SELECT \* FROM `orders` WHERE \(`product_id` = :NAME\)");
    assert!(re.is_match(&builder.to_sql()?));
    Ok(())
}

#[test]
fn joins_only_render_for_select() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder
        .from_aliased("orders", "o")
        .inner_join(("customers", "c"), "c.id = o.customer_id")
        .right_join("products", "products.id = o.product_id")
        .natural_join("regions")
        .left_outer_join("notes", None)
        .select_aliased("o", ["id", "price"]);
    assert_eq!(
        builder.to_sql()?,
        "SELECT `o`.`id`, `o`.`price` FROM `orders` `o` \
         INNER JOIN `customers` `c` ON c.id = o.customer_id \
         RIGHT JOIN `products` ON products.id = o.product_id \
         NATURAL JOIN `regions` LEFT OUTER JOIN `notes`"
    );

    builder.set_delete();
    assert_eq!(builder.to_sql()?, "DELETE FROM `orders` `o`");
    Ok(())
}

#[test]
fn update_uses_one_placeholder_style() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder
        .from("orders")
        .and_where("id", "=", 3)?
        .set_update([("customer_id", RowValues::Int(20)), ("price", RowValues::Float(1.5))])?;
    let built = builder.build()?;
    let re = named(
        r"UPDATE `orders` SET `customer_id` = :NAME, `price` = :NAME WHERE \(`id` = :NAME\)",
    );
    assert!(re.is_match(&built.query), "{}", built.query);
    assert!(matches!(built.params, Bindings::Named(_)));
    assert_eq!(
        built.params.values(),
        vec![&RowValues::Int(20), &RowValues::Float(1.5), &RowValues::Int(3)]
    );
    Ok(())
}

#[test]
fn grouping_having_and_ordering() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = StatementBuilder::new();
    builder
        .from("orders")
        .select([ColumnRef::new("customer_id"), ColumnRef::raw("SUM(price) AS spent")])?
        .group_by("customer_id")?
        .and_having_aliased("", "spent", ">=", 100)?
        .order_by("spent", "desc")?
        .order_by_asc("customer_id")?;
    let re = named(
        r"SELECT `customer_id`, SUM\(price\) AS spent FROM `orders` GROUP BY `customer_id` HAVING \(`spent` >= :NAME\) ORDER BY `spent` DESC, `customer_id` ASC",
    );
    assert!(re.is_match(&builder.to_sql()?));
    Ok(())
}

#[test]
fn validation_errors_name_the_allowed_values() {
    let mut builder = StatementBuilder::new();
    builder.from("t");

    let err = builder.and_where("a", "===", 1).unwrap_err();
    assert!(matches!(err, SqlFluentError::InvalidComparisonOperator { ref given, .. } if given == "==="));
    assert!(err.to_string().contains("LIKE"));

    let err = builder.order_by("a", "up").unwrap_err();
    assert!(matches!(err, SqlFluentError::InvalidSortDirection { .. }));
    assert!(err.to_string().contains("ASC, DESC"));

    let err = builder.group_by("a.b.c").unwrap_err();
    assert!(matches!(err, SqlFluentError::InvalidProjectionShape(_)));

    assert!(matches!(
        StatementBuilder::new().build(),
        Err(SqlFluentError::MissingBaseTable)
    ));
}

#[test]
fn quote_identifier_doubles_backticks() {
    assert_eq!(quote_identifier("orders"), "`orders`");
    assert_eq!(quote_identifier("a`b"), "`a``b`");
}

use erdview_parser::{Cardinality, EntityDecl, KeyKind, error::ErrorCode, parse};

#[test]
fn test_order_management_schema() {
    let source = r#"
erDiagram
    %% Customers place orders made of line items
    CUSTOMER ||--o{ ORDER : places
    ORDER ||--|{ LINE-ITEM : contains
    PRODUCT ||--o{ LINE-ITEM : "ordered in"
    CUSTOMER }|..|{ DELIVERY-ADDRESS : uses

    CUSTOMER {
        string id PK
        string name "full name"
        string email UK
    }
    ORDER {
        int orderNumber PK
        string customerId FK
        decimal(10,2) total
    }
"#;

    let diagram = parse(source).expect("Failed to parse");

    let names: Vec<_> = diagram.entities().map(EntityDecl::name).collect();
    assert_eq!(
        names,
        ["CUSTOMER", "ORDER", "LINE-ITEM", "PRODUCT", "DELIVERY-ADDRESS"]
    );
    assert_eq!(diagram.relationships().len(), 4);

    let order = diagram.entity("ORDER").expect("ORDER entity");
    assert_eq!(order.attributes()[1].keys(), [KeyKind::Foreign]);
    assert_eq!(order.attributes()[2].data_type(), "decimal(10,2)");

    let uses = &diagram.relationships()[3];
    assert!(!uses.is_identifying());
    assert_eq!(uses.left_cardinality(), Cardinality::OneOrMore);
    assert_eq!(uses.right_cardinality(), Cardinality::OneOrMore);

    assert_eq!(diagram.relationships()[2].label(), "ordered in");
    assert!(diagram.entity("PRODUCT").unwrap().attributes().is_empty());
}

#[test]
fn test_error_reports_source_location() {
    let source = "erDiagram\n    USERS ||--o{ ORDERS\n";

    let err = parse(source).expect_err("label is missing");
    let diagnostic = &err.diagnostics()[0];

    assert_eq!(diagnostic.code(), Some(ErrorCode::E104));
    assert_eq!(diagnostic.help(), Some("add `: label` after the related entity"));

    let span = diagnostic.primary_span().expect("primary span");
    assert_eq!(&source[span.to_range()], "USERS ||--o{ ORDERS");
    assert_eq!(
        err.to_string(),
        "error[E104]: missing relationship label"
    );
}

mod common;

use common::{WIDGET, initial_dataset, initial_schema, root, root_mut};
use jsonform_schema::{
    DataType, FieldType, Schema, SchemaError,
    builder::{
        BuildContext, ItemSpec, default_value_binding, field_defaults,
        get_schema_item_by_field_type, get_schema_item_for, set_schema_item_field_type,
    },
    parse,
    schema::ARRAY_ITEM_KEY,
};
use serde_json::{Value, json};

const CITY: &str = "schema.__root_schema__.children.address.children.city";
const HOBBIES: &str = "schema.__root_schema__.children.hobbies";
const NAME: &str = "schema.__root_schema__.children.name";

fn binding(path: &str) -> Option<Value> {
    Some(Value::String(default_value_binding(WIDGET, path)))
}

#[test]
fn switches_a_leaf_to_a_select() {
    let schema = initial_schema();
    let item = get_schema_item_by_field_type(FieldType::Select, WIDGET, &schema, CITY)
        .expect("retype city");

    assert_eq!(item.identifier, "city");
    assert_eq!(item.original_identifier, "city");
    assert_eq!(item.accessor, "city");
    assert_eq!(item.label, "City");
    assert_eq!(item.position, 1);
    assert_eq!(item.data_type, DataType::String);
    assert_eq!(item.field_type, FieldType::Select);
    assert_eq!(item.source_data, Some(json!("1")));
    assert_eq!(item.default_value, binding("sourceData.address.city"));
    assert!(item.is_visible);
    assert!(!item.is_required);
    assert_eq!(item.props, field_defaults(FieldType::Select));
    assert!(item.is_field_type_overridden);
}

#[test]
fn keeps_renamed_accessor_and_flags() {
    let mut schema = initial_schema();
    {
        let city = &mut root_mut(&mut schema).children["address"].children["city"];
        city.accessor = "town".to_string();
        city.label = "Town".to_string();
        city.is_disabled = true;
    }
    let item = get_schema_item_by_field_type(FieldType::Switch, WIDGET, &schema, CITY)
        .expect("retype city");
    assert_eq!(item.accessor, "town");
    assert_eq!(item.label, "Town");
    assert!(item.is_disabled);
    assert_eq!(item.original_identifier, "city");
    assert_eq!(item.props.get("alignWidget"), Some(&json!("LEFT")));
}

#[test]
fn custom_fields_are_rebuilt_from_stand_in_data() {
    let mut schema = initial_schema();
    let spec = ItemSpec {
        is_custom_field: true,
        ..ItemSpec::new("customField1", "customField1", "sourceData.customField1")
    };
    let mut custom = get_schema_item_for(BuildContext::new(WIDGET), &spec, Some(&json!("")));
    custom.position = 9;
    root_mut(&mut schema)
        .children
        .insert("customField1".to_string(), custom);

    let path = "schema.__root_schema__.children.customField1";
    let item = get_schema_item_by_field_type(FieldType::Array, WIDGET, &schema, path)
        .expect("retype custom field");
    assert!(item.is_custom_field);
    assert_eq!(item.default_value, None);
    assert_eq!(item.source_data, Some(json!([{}])));
    assert_eq!(item.data_type, DataType::Array);
    assert_eq!(item.position, 9);
    let template = item.array_item().expect("template");
    assert_eq!(template.data_type, DataType::Object);
    assert!(template.children.is_empty());

    let item = get_schema_item_by_field_type(FieldType::NumberInput, WIDGET, &schema, path)
        .expect("retype custom field");
    assert_eq!(item.source_data, Some(json!(0)));
    assert_eq!(item.data_type, DataType::Number);
}

#[test]
fn multiselect_to_array_builds_a_primitive_template() {
    let schema = initial_schema();
    let item = get_schema_item_by_field_type(FieldType::Array, WIDGET, &schema, HOBBIES)
        .expect("retype hobbies");

    assert_eq!(item.field_type, FieldType::Array);
    assert_eq!(item.data_type, DataType::Array);
    assert_eq!(item.default_value, binding("sourceData.hobbies"));
    assert_eq!(item.children.len(), 1);
    let template = &item.children[ARRAY_ITEM_KEY];
    assert_eq!(template.data_type, DataType::String);
    assert_eq!(template.field_type, FieldType::TextInput);
    assert_eq!(template.source_data, Some(json!("travelling")));
    assert_eq!(template.default_value, None);
    assert_eq!(template.label, "Array Item");
    assert_eq!(template.position, 0);
}

#[test]
fn text_to_array_builds_an_empty_object_template() {
    let schema = initial_schema();
    let item = get_schema_item_by_field_type(FieldType::Array, WIDGET, &schema, NAME)
        .expect("retype name");

    assert_eq!(item.data_type, DataType::String);
    assert_eq!(item.source_data, Some(json!("John")));
    let template = item.array_item().expect("template");
    assert_eq!(template.data_type, DataType::Object);
    assert_eq!(template.field_type, FieldType::Object);
    assert_eq!(template.source_data, Some(json!({})));
    assert!(template.children.is_empty());
}

#[test]
fn fields_inside_array_templates_stay_unbound() {
    let mut schema = initial_schema();
    let path = "schema.__root_schema__.children.education.children.__array_item__.children.college";
    set_schema_item_field_type(FieldType::Select, WIDGET, &mut schema, path)
        .expect("retype college");
    let template = root(&schema).children["education"]
        .array_item()
        .expect("template");
    let college = &template.children["college"];
    assert_eq!(college.field_type, FieldType::Select);
    assert_eq!(college.default_value, None);
    assert_eq!(college.position, 0);
}

#[test]
fn hand_picked_kinds_survive_reparsing() {
    let mut schema = initial_schema();
    set_schema_item_field_type(FieldType::Select, WIDGET, &mut schema, CITY)
        .expect("retype city");

    let mut sample = initial_dataset();
    sample["address"]["city"] = json!("2");
    let schema = parse(WIDGET, Some(&sample), &schema).expect("reparse");
    let city = &root(&schema).children["address"].children["city"];
    assert_eq!(city.field_type, FieldType::Select);
    assert_eq!(city.source_data, Some(json!("2")));

    sample["address"]["city"] = json!(5);
    let schema = parse(WIDGET, Some(&sample), &schema).expect("reparse");
    let city = &root(&schema).children["address"].children["city"];
    assert_eq!(city.data_type, DataType::Number);
    assert_eq!(city.field_type, FieldType::Select);
    assert!(city.is_field_type_overridden);
    assert_eq!(city.position, 1);
}

#[test]
fn hand_picked_options_and_literal_defaults_survive_a_type_change() {
    let path = "schema.__root_schema__.children.age";
    let mut schema = parse(WIDGET, Some(&json!({ "age": "x" })), &Schema::new())
        .expect("parse sample");
    set_schema_item_field_type(FieldType::Select, WIDGET, &mut schema, path).expect("retype age");
    {
        let age = &mut root_mut(&mut schema).children["age"];
        age.props
            .insert("options".to_string(), json!([{ "label": "Mine", "value": "M" }]));
        age.default_value = Some(json!("literal default"));
    }

    let schema = parse(WIDGET, Some(&json!({ "age": 5 })), &schema).expect("reparse");
    let age = &root(&schema).children["age"];
    assert_eq!(age.data_type, DataType::Number);
    assert_eq!(age.field_type, FieldType::Select);
    assert_eq!(
        age.props.get("options"),
        Some(&json!([{ "label": "Mine", "value": "M" }]))
    );
    assert_eq!(age.props.get("isFilterable"), Some(&json!(false)));
    assert_eq!(age.default_value, Some(json!("literal default")));
    assert_eq!(age.source_data, Some(json!(5)));
}

#[test]
fn bad_paths_are_reported() {
    let schema = initial_schema();
    assert!(matches!(
        get_schema_item_by_field_type(
            FieldType::Select,
            WIDGET,
            &schema,
            "schema.__root_schema__.children.missing"
        ),
        Err(SchemaError::ItemNotFound { .. })
    ));
    assert!(matches!(
        get_schema_item_by_field_type(FieldType::Select, WIDGET, &schema, "address.city"),
        Err(SchemaError::InvalidItemPath { .. })
    ));
}

//! A small but realistic schema: contacts, rooms, messages, journeys and
//! automation rules, exercised end to end the way the external engine would
//! drive it.

use std::collections::HashMap;

use recordkit_schema::{
    validate_payload, AccessRule, ActionKind, CallerRole, Constraints, CustomAction, Dependency,
    FieldInfo, HttpMethod, Model, OnDeletePolicy, RelationshipRule, ResolvedDependencies, Schema,
    SchemaBuilder, Session, SideEffect, UniqueRule,
};
use recordkit_validation::validators::{
    boolean, custom_fields, email, object_id, person_name, phone, string_medium, string_short,
};
use recordkit_validation::{list_validator_empty_ok, object_validator, ValidationError};
use serde_json::{json, Map, Value};

fn record(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn contact_model() -> Model {
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field(
            "name",
            FieldInfo::new(person_name())
                .required()
                .example(json!("Ada Lovelace")),
        )
        .field("email", FieldInfo::new(email()))
        .field("phone", FieldInfo::new(phone()))
        .field(
            "sms_consent",
            FieldInfo::new(boolean()).initializer(|candidate, _session| {
                candidate.contains_key("phone").then(|| json!(true))
            }),
        )
        .field("fields", FieldInfo::new(custom_fields()))
        .constraints(
            Constraints::new()
                .unique(UniqueRule::field("email"))
                .relationship(RelationshipRule::new(
                    "contact_method_required",
                    |candidate, _resolved, _session| {
                        if candidate.contains_key("email") || candidate.contains_key("phone") {
                            Ok(())
                        } else {
                            Err(ValidationError::new("One of email or phone is required"))
                        }
                    },
                )),
        )
        .side_effect(
            ActionKind::Update,
            SideEffect::new("journey_transition", "re-evaluate journey state membership"),
        )
}

fn room_model() -> Model {
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field("name", FieldInfo::new(string_short()).required())
        .field(
            "members",
            FieldInfo::new(object_id().list_empty_ok())
                .dependency(Dependency::on(["user"]).on_delete(OnDeletePolicy::Unset)),
        )
        .constraints(Constraints::new().access(AccessRule::filter("members")))
}

fn message_model() -> Model {
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field("body", FieldInfo::new(string_medium()).required())
        .field(
            "room_id",
            FieldInfo::new(object_id())
                .required()
                .updates_disabled()
                .dependency(Dependency::on(["room"]).on_delete(OnDeletePolicy::Delete)),
        )
        .field(
            "sender_id",
            // A sender may be a staff user or an end-user contact.
            FieldInfo::new(object_id())
                .required()
                .dependency(Dependency::on(["user", "contact"]).on_delete(OnDeletePolicy::SetNull)),
        )
        .field("log_only", FieldInfo::new(boolean()))
        .constraints(
            Constraints::new()
                .access(AccessRule::dependency("room", "id", "room_id"))
                .relationship(RelationshipRule::new(
                    "consent_required",
                    |candidate, resolved, _session| {
                        if candidate.get("log_only") == Some(&json!(true)) {
                            return Ok(());
                        }
                        let consented = resolved.get("contact").into_iter().flatten().any(
                            |contact| contact.get("sms_consent") == Some(&json!(true)),
                        );
                        if consented {
                            Ok(())
                        } else {
                            Err(ValidationError::new(
                                "Sending requires consent on the linked contact",
                            ))
                        }
                    },
                )),
        )
        .restricted_actions([ActionKind::Create, ActionKind::Read, ActionKind::ReadMany])
        .custom_action(
            CustomAction::new("send", HttpMethod::Post, "/messages/send")
                .access(ActionKind::Create),
        )
        .side_effect(
            ActionKind::Create,
            SideEffect::new("deliver", "dispatch the message to the room's transport"),
        )
}

fn journey_model() -> Model {
    let state_shape = object_validator([
        ("name", string_short().build()),
        ("description", string_medium().optional().build()),
    ]);
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field("name", FieldInfo::new(string_short()).required())
        .field(
            "states",
            FieldInfo::new(list_validator_empty_ok(&state_shape)).required(),
        )
        .constraints(
            Constraints::new()
                .unique(UniqueRule::field("name"))
                .unique(UniqueRule::array_by_key("states", "name")),
        )
}

fn automation_model() -> Model {
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field("event", FieldInfo::new(string_short()).required())
        .field("action", FieldInfo::new(string_short()).required())
        .constraints(
            // Enforced by the rules engine at registration time; declared
            // here so the contract stays visible on the model.
            Constraints::new()
                .relationship(RelationshipRule::declared_only("unique_event_action")),
        )
}

fn user_model() -> Model {
    Model::new()
        .field("id", FieldInfo::new(object_id()).readonly())
        .field("name", FieldInfo::new(person_name()).required())
        .field("email", FieldInfo::new(email()).required())
        .constraints(Constraints::new().global_unique("email"))
}

fn build_schema() -> Schema {
    SchemaBuilder::new()
        .entity("contact", contact_model())
        .entity("room", room_model())
        .entity("message", message_model())
        .entity("journey", journey_model())
        .entity("automation", automation_model())
        .entity("user", user_model())
        .build()
        .expect("schema must assemble")
}

#[test]
fn schema_assembles_and_verifies_targets() {
    let schema = build_schema();
    assert_eq!(schema.len(), 6);
    assert!(schema.entity("journey").is_some());
    assert!(schema.entity("nonexistent").is_none());
}

#[test]
fn contact_create_validates_normalizes_and_initializes() {
    let schema = build_schema();
    let contact = schema.entity("contact").unwrap();
    let session = Session::staff("u1", "t1");

    let payload = record(json!({
        "name": "ada lovelace",
        "email": "Ada@Example.com",
        "phone": "(415) 555-1234"
    }));
    let mut candidate = validate_payload(&contact.validation(), &payload).unwrap();
    recordkit_schema::apply_initializers(&contact.fields, &mut candidate, &session);

    assert_eq!(candidate["name"], json!("Ada lovelace"));
    assert_eq!(candidate["email"], json!("ada@example.com"));
    assert_eq!(candidate["phone"], json!("+14155551234"));
    assert_eq!(candidate["sms_consent"], json!(true));

    contact
        .check_relationships(&candidate, &ResolvedDependencies::new(), &session)
        .unwrap();
}

#[test]
fn contact_without_contact_method_fails_the_relationship_rule() {
    let schema = build_schema();
    let contact = schema.entity("contact").unwrap();
    let session = Session::staff("u1", "t1");

    let candidate = record(json!({"name": "Ada"}));
    let err = contact
        .check_relationships(&candidate, &ResolvedDependencies::new(), &session)
        .unwrap_err();
    assert_eq!(err.message, "One of email or phone is required");
}

#[test]
fn readonly_and_unknown_fields_are_rejected_together() {
    let schema = build_schema();
    let contact = schema.entity("contact").unwrap();

    let payload = record(json!({
        "id": "0123456789abcdef01234567",
        "bogus": 1,
        "email": "a@b.co"
    }));
    let errors = validate_payload(&contact.validation(), &payload).unwrap_err();
    // `id` is readonly, so it is as unexpected as `bogus`; `name` is missing.
    assert!(errors.has_field_errors("id"));
    assert!(errors.has_field_errors("bogus"));
    assert!(errors.has_field_errors("name"));
}

#[test]
fn journey_create_rejects_duplicate_state_names() {
    let schema = build_schema();
    let journey = schema.entity("journey").unwrap();

    let duplicate = record(json!({
        "name": "Onboarding",
        "states": [
            {"name": "A", "description": "first"},
            {"name": "A", "description": "entirely different"}
        ]
    }));
    let candidate = validate_payload(&journey.validation(), &duplicate).unwrap();
    let errors = journey.constraints.check_unique_within(&candidate).unwrap_err();
    assert!(errors.has_field_errors("states"));

    let distinct = record(json!({
        "name": "Onboarding",
        "states": [{"name": "A"}, {"name": "B"}]
    }));
    let candidate = validate_payload(&journey.validation(), &distinct).unwrap();
    assert!(journey.constraints.check_unique_within(&candidate).is_ok());
}

#[test]
fn message_consent_rule_reads_resolved_dependencies() {
    let schema = build_schema();
    let message = schema.entity("message").unwrap();
    let session = Session::staff("u1", "t1");

    let candidate = record(json!({
        "body": "hello",
        "room_id": "aaaaaaaaaaaaaaaaaaaaaaaa",
        "sender_id": "bbbbbbbbbbbbbbbbbbbbbbbb"
    }));

    let mut resolved: ResolvedDependencies = HashMap::new();
    resolved.insert("contact".into(), vec![json!({"sms_consent": false})]);
    let err = message
        .check_relationships(&candidate, &resolved, &session)
        .unwrap_err();
    assert_eq!(err.message, "Sending requires consent on the linked contact");

    resolved.insert("contact".into(), vec![json!({"sms_consent": true})]);
    assert!(message.check_relationships(&candidate, &resolved, &session).is_ok());

    // The log-only flag bypasses the consent requirement.
    let logged = record(json!({
        "body": "imported",
        "room_id": "aaaaaaaaaaaaaaaaaaaaaaaa",
        "sender_id": "bbbbbbbbbbbbbbbbbbbbbbbb",
        "log_only": true
    }));
    let none: ResolvedDependencies = HashMap::new();
    assert!(message.check_relationships(&logged, &none, &session).is_ok());
}

#[test]
fn message_access_is_inherited_from_the_room() {
    let schema = build_schema();
    let message = schema.entity("message").unwrap();
    let session = Session::staff("u1", "t1");

    let rec = record(json!({"tenant_id": "t1", "room_id": "r1"}));

    let mut resolved: ResolvedDependencies = HashMap::new();
    resolved.insert("room".into(), vec![json!({"id": "r1"})]);
    assert!(message.access_granted(&rec, &session, &resolved));

    resolved.insert("room".into(), vec![json!({"id": "r2"})]);
    assert!(!message.access_granted(&rec, &session, &resolved));
}

#[test]
fn tenant_mismatch_denies_even_without_rules() {
    let schema = build_schema();
    let contact = schema.entity("contact").unwrap();
    let session = Session::staff("u1", "t1");

    let foreign = record(json!({"tenant_id": "t2", "name": "Ada"}));
    assert!(!contact.access_granted(&foreign, &session, &ResolvedDependencies::new()));
}

#[test]
fn external_role_gets_the_restricted_subset() {
    let schema = build_schema();
    let message = schema.entity("message").unwrap();

    assert!(message.allows(CallerRole::External, ActionKind::Create));
    assert!(!message.allows(CallerRole::External, ActionKind::Delete));
    assert!(message.allows(CallerRole::Staff, ActionKind::Delete));

    // Contacts grant external callers nothing.
    let contact = schema.entity("contact").unwrap();
    assert!(!contact.allows(CallerRole::External, ActionKind::Read));
}

#[test]
fn cascade_plan_covers_every_referencing_field() {
    let schema = build_schema();

    let room_plan = schema.dependents_of("room");
    assert_eq!(room_plan.len(), 1);
    assert_eq!(room_plan[0].entity, "message");
    assert_eq!(room_plan[0].on_delete, OnDeletePolicy::Delete);

    // Contacts are referenced by message senders (OR'd with users).
    let contact_plan = schema.dependents_of("contact");
    assert_eq!(contact_plan.len(), 1);
    assert_eq!(contact_plan[0].field, "sender_id");
    assert_eq!(contact_plan[0].on_delete, OnDeletePolicy::SetNull);

    let user_plan = schema.dependents_of("user");
    assert_eq!(user_plan.len(), 2);
}

#[test]
fn update_validation_excludes_create_only_fields() {
    let schema = build_schema();
    let message = schema.entity("message").unwrap();

    let update = message.validation_for_update();
    assert!(!update.contains_key("room_id"));
    assert!(update.contains_key("body"));
}

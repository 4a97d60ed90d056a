//! Caller-supplied input shapes for create and update.
//!
//! # Invariants
//! - `NewEmployee` is fully formed: missing fields decode to zero values.
//! - `PartialEmployee` records field presence with `Option`; `None` (absent
//!   or JSON `null`) never overwrites a stored value.

use super::employee::{Address, Employee};
use serde::{Deserialize, Serialize};

/// Create input: a complete employee with an optional nested address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    pub salary: f64,
    pub address: NewAddress,
}

/// Address portion of a create request. All-empty means "no address".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl NewEmployee {
    /// Decodes a create request body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

impl NewAddress {
    /// Returns whether no address field carries a value.
    pub fn is_blank(&self) -> bool {
        self.street.is_empty() && self.city.is_empty() && self.state.is_empty() && self.zip.is_empty()
    }
}

/// Update input where every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialEmployee {
    pub name: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub address: Option<PartialAddress>,
}

/// Address portion of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl PartialEmployee {
    /// Decodes an update request body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Overlays present fields onto `employee`, keeping every absent field.
    ///
    /// `id` and the audit block are never touched. When the input carries an
    /// address and the employee has none yet, an unsaved address linked to
    /// the employee is created to receive the fields.
    pub fn merge_into(&self, employee: &mut Employee) {
        overwrite(&mut employee.name, &self.name);
        overwrite(&mut employee.position, &self.position);
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }

        if let Some(partial) = &self.address {
            let employee_id = employee.id;
            let address = employee
                .address
                .get_or_insert_with(|| Address::unsaved(employee_id));
            partial.merge_into(address);
        }
    }
}

impl PartialAddress {
    /// Overlays present fields onto `address`.
    pub fn merge_into(&self, address: &mut Address) {
        overwrite(&mut address.street, &self.street);
        overwrite(&mut address.city, &self.city);
        overwrite(&mut address.state, &self.state);
        overwrite(&mut address.zip, &self.zip);
    }
}

fn overwrite(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::{NewEmployee, PartialEmployee};
    use crate::model::audit::Audit;
    use crate::model::employee::{Address, Employee};

    fn stored_employee() -> Employee {
        Employee {
            id: 7,
            name: "A".to_string(),
            position: "B".to_string(),
            salary: 100.0,
            address: Some(Address {
                id: Some(3),
                street: "1 First St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
                employee_id: 7,
                audit: Audit::default(),
            }),
            audit: Audit {
                created_at: 10,
                updated_at: 20,
                deleted_at: None,
            },
        }
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut employee = stored_employee();
        let patch = PartialEmployee::from_json(r#"{"position":"C"}"#).unwrap();

        patch.merge_into(&mut employee);

        assert_eq!(employee.name, "A");
        assert_eq!(employee.position, "C");
        assert_eq!(employee.salary, 100.0);
        assert_eq!(employee.address, stored_employee().address);
    }

    #[test]
    fn merge_treats_null_as_absent() {
        let mut employee = stored_employee();
        let patch = PartialEmployee::from_json(r#"{"name":null,"salary":null}"#).unwrap();

        patch.merge_into(&mut employee);

        assert_eq!(employee, stored_employee());
    }

    #[test]
    fn merge_can_set_salary_to_zero_explicitly() {
        let mut employee = stored_employee();
        let patch = PartialEmployee::from_json(r#"{"salary":0}"#).unwrap();

        patch.merge_into(&mut employee);

        assert_eq!(employee.salary, 0.0);
    }

    #[test]
    fn merge_keeps_identity_and_audit() {
        let mut employee = stored_employee();
        let patch =
            PartialEmployee::from_json(r#"{"id":99,"created_at":1,"name":"Z"}"#).unwrap();

        patch.merge_into(&mut employee);

        assert_eq!(employee.id, 7);
        assert_eq!(employee.audit, stored_employee().audit);
        assert_eq!(employee.name, "Z");
    }

    #[test]
    fn merge_creates_unsaved_address_when_missing() {
        let mut employee = stored_employee();
        employee.address = None;
        let patch = PartialEmployee::from_json(r#"{"address":{"zip":"99999"}}"#).unwrap();

        patch.merge_into(&mut employee);

        let address = employee.address.expect("address should be created");
        assert_eq!(address.id, None);
        assert_eq!(address.employee_id, 7);
        assert_eq!(address.zip, "99999");
        assert!(!address.is_writable());
    }

    #[test]
    fn create_input_defaults_missing_fields_to_zero_values() {
        let input = NewEmployee::from_json(r#"{"name":"Solo"}"#).unwrap();

        assert_eq!(input.name, "Solo");
        assert_eq!(input.position, "");
        assert_eq!(input.salary, 0.0);
        assert!(input.address.is_blank());
    }

    #[test]
    fn malformed_input_fails_to_decode() {
        assert!(NewEmployee::from_json("{invalid json").is_err());
        assert!(PartialEmployee::from_json(r#"{"salary":"lots"}"#).is_err());
    }
}

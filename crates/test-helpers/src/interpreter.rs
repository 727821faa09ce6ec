//! Command interpreter behind [`FakeLedger`](crate::FakeLedger).
//!
//! Understands exactly the commands provisioning emits: package publish,
//! transfer-policy creation, rule attachment, object transfer and sharing.
//! Anything else aborts the transaction with a failure status, just as an
//! unknown function would on a real ledger.

use kiosk_provisioner_effects::{
    publisher_type, transfer_policy_cap_type, transfer_policy_type, upgrade_cap_type,
};
use kiosk_provisioner_types::{
    Argument, CallArg, Command, Digest, MoveCall, ObjectChange, ObjectDigest, ObjectId, Owner,
    PackageId, SequenceNumber, StructTag, SuiAddress, TransactionData, TransactionDigest, TypeTag,
    MAX_BASIS_POINTS,
};
use std::collections::{HashMap, HashSet};

/// An object held by the fake ledger.
#[derive(Debug, Clone)]
pub(crate) struct LiveObject {
    pub object_type: StructTag,
    pub owner: Owner,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    /// Package a `Publisher` was claimed for.
    pub origin: Option<PackageId>,
}

/// Committed ledger contents.
#[derive(Debug, Default)]
pub(crate) struct WorldState {
    pub objects: HashMap<ObjectId, LiveObject>,
    pub packages: HashSet<PackageId>,
}

impl WorldState {
    fn knows_package(&self, package: &PackageId) -> bool {
        *package == PackageId::MOVE_STDLIB
            || *package == PackageId::SUI_FRAMEWORK
            || self.packages.contains(package)
    }
}

#[derive(Debug, Clone)]
enum Value {
    Object(ObjectId),
    Pure(Vec<u8>),
}

#[derive(Debug)]
struct NewObject {
    id: ObjectId,
    object_type: StructTag,
    owner: Option<Owner>,
    origin: Option<PackageId>,
}

/// One transaction being interpreted against a read-only view of the world.
pub(crate) struct Execution<'a> {
    world: &'a WorldState,
    sender: SuiAddress,
    digest: TransactionDigest,
    inputs: &'a [CallArg],
    version: SequenceNumber,
    results: Vec<Vec<Value>>,
    published: Vec<(PackageId, Vec<String>)>,
    created: Vec<NewObject>,
    touched: Vec<(ObjectId, LiveObject)>,
    fresh: u64,
}

/// Writes of a successful execution, not yet applied.
pub(crate) struct Outcome {
    version: SequenceNumber,
    published: Vec<(PackageId, Vec<String>)>,
    created: Vec<NewObject>,
    touched: Vec<(ObjectId, LiveObject)>,
}

pub(crate) fn object_digest(id: &ObjectId, version: SequenceNumber) -> ObjectDigest {
    Digest::from_parts(&[id.as_bytes(), &version.value().to_le_bytes()])
}

impl<'a> Execution<'a> {
    /// Interpret `data`, returning its writes or the abort message.
    pub fn run(
        world: &'a WorldState,
        data: &'a TransactionData,
        digest: TransactionDigest,
    ) -> Result<Outcome, String> {
        let mut execution = Self::new(world, data, digest)?;
        for (index, command) in data.commands().iter().enumerate() {
            let results = execution
                .command(command)
                .map_err(|error| format!("command {index} ({}): {error}", command.kind()))?;
            execution.results.push(results);
        }
        execution.finish()
    }

    fn new(
        world: &'a WorldState,
        data: &'a TransactionData,
        digest: TransactionDigest,
    ) -> Result<Self, String> {
        let mut touched = Vec::new();
        for input in &data.kind.inputs {
            let CallArg::Object(object_ref) = input else {
                continue;
            };
            let live = world
                .objects
                .get(&object_ref.object_id)
                .ok_or_else(|| format!("object {} not found", object_ref.object_id))?;
            if live.version != object_ref.version || live.digest != object_ref.digest {
                return Err(format!(
                    "object {} is at {}, input references {}",
                    object_ref.object_id, live.version, object_ref.version
                ));
            }
            if !live.owner.is_address_owned_by(&data.sender) {
                return Err(format!(
                    "object {} is not owned by the sender",
                    object_ref.object_id
                ));
            }
            touched.push((object_ref.object_id, live.clone()));
        }

        let version = touched
            .iter()
            .map(|(_, live)| live.version)
            .max()
            .unwrap_or(SequenceNumber::ZERO)
            .next();

        Ok(Self {
            world,
            sender: data.sender,
            digest,
            inputs: &data.kind.inputs,
            version,
            results: Vec::new(),
            published: Vec::new(),
            created: Vec::new(),
            touched,
            fresh: 0,
        })
    }

    fn fresh_bytes(&mut self) -> [u8; 32] {
        let counter = self.fresh.to_le_bytes();
        self.fresh += 1;
        *Digest::from_parts(&[self.digest.as_bytes(), &counter]).as_bytes()
    }

    fn create(
        &mut self,
        object_type: StructTag,
        owner: Option<Owner>,
        origin: Option<PackageId>,
    ) -> ObjectId {
        let id = ObjectId::new(self.fresh_bytes());
        self.created.push(NewObject {
            id,
            object_type,
            owner,
            origin,
        });
        id
    }

    fn resolve(&self, argument: Argument) -> Result<Value, String> {
        match argument {
            Argument::GasCoin => Err("gas coin arguments are not supported".to_string()),
            Argument::Input(index) => match self.inputs.get(index as usize) {
                Some(CallArg::Object(object_ref)) => Ok(Value::Object(object_ref.object_id)),
                Some(CallArg::Pure(bytes)) => Ok(Value::Pure(bytes.clone())),
                None => Err(format!("input {index} out of range")),
            },
            Argument::Result(index) => match self.results.get(index as usize) {
                Some(values) if values.len() == 1 => Ok(values[0].clone()),
                Some(values) => Err(format!(
                    "result {index} has {} values, expected one",
                    values.len()
                )),
                None => Err(format!("result {index} not yet available")),
            },
            Argument::NestedResult(index, nested) => self
                .results
                .get(index as usize)
                .and_then(|values| values.get(nested as usize))
                .cloned()
                .ok_or_else(|| format!("result {index}.{nested} not available")),
        }
    }

    fn resolve_object(&self, argument: Argument) -> Result<ObjectId, String> {
        match self.resolve(argument)? {
            Value::Object(id) => Ok(id),
            Value::Pure(_) => Err("expected an object, found a pure value".to_string()),
        }
    }

    fn resolve_pure(&self, argument: Argument) -> Result<Vec<u8>, String> {
        match self.resolve(argument)? {
            Value::Pure(bytes) => Ok(bytes),
            Value::Object(id) => Err(format!("expected a pure value, found object {id}")),
        }
    }

    fn object_type(&self, id: &ObjectId) -> Option<(&StructTag, Option<PackageId>)> {
        if let Some(new) = self.created.iter().find(|new| new.id == *id) {
            return Some((&new.object_type, new.origin));
        }
        self.touched
            .iter()
            .find(|(touched, _)| touched == id)
            .map(|(_, live)| (&live.object_type, live.origin))
    }

    fn expect_type(&self, id: &ObjectId, expected: &StructTag) -> Result<(), String> {
        match self.object_type(id) {
            Some((actual, _)) if actual == expected => Ok(()),
            Some((actual, _)) => Err(format!("expected {expected}, found {actual}")),
            None => Err(format!("object {id} is not available to this transaction")),
        }
    }

    fn set_owner(&mut self, id: &ObjectId, owner: Owner) -> Result<(), String> {
        if let Some(new) = self.created.iter_mut().find(|new| new.id == *id) {
            new.owner = Some(owner);
            return Ok(());
        }
        if let Some((_, live)) = self.touched.iter_mut().find(|(touched, _)| touched == id) {
            live.owner = owner;
            return Ok(());
        }
        Err(format!("object {id} is not available to this transaction"))
    }

    fn command(&mut self, command: &Command) -> Result<Vec<Value>, String> {
        match command {
            Command::Publish(modules, dependencies) => self.publish(modules, dependencies),
            Command::MoveCall(call) => self.move_call(call),
            Command::TransferObjects(objects, recipient) => self.transfer(objects, *recipient),
        }
    }

    fn publish(
        &mut self,
        modules: &[Vec<u8>],
        dependencies: &[PackageId],
    ) -> Result<Vec<Value>, String> {
        if modules.is_empty() {
            return Err("package has no modules".to_string());
        }
        if let Some(missing) = dependencies
            .iter()
            .find(|dep| !self.world.knows_package(dep))
        {
            return Err(format!("dependency {missing} is not published"));
        }

        let package_id = PackageId::new(self.fresh_bytes());
        let names = modules
            .iter()
            .enumerate()
            .map(|(index, bytecode)| {
                String::from_utf8(bytecode.clone()).unwrap_or_else(|_| format!("module_{index}"))
            })
            .collect();
        self.published.push((package_id, names));

        self.create(
            publisher_type(),
            Some(Owner::AddressOwner(self.sender)),
            Some(package_id),
        );
        let upgrade_cap = self.create(upgrade_cap_type(), None, None);
        Ok(vec![Value::Object(upgrade_cap)])
    }

    fn move_call(&mut self, call: &MoveCall) -> Result<Vec<Value>, String> {
        let target = (call.module.as_str(), call.function.as_str());
        if call.package == PackageId::SUI_FRAMEWORK {
            return match target {
                ("transfer_policy", "new") => self.new_policy(call),
                ("transfer", "public_share_object") => self.share(call),
                _ => Err(format!("function {} not found", call.target())),
            };
        }

        let rules_known = self.world.packages.contains(&call.package)
            || self.published.iter().any(|(id, _)| *id == call.package);
        match target {
            ("royalty_rule" | "kiosk_lock_rule" | "personal_kiosk_rule", "add") if rules_known => {
                self.add_rule(call)
            }
            _ => Err(format!("function {} not found", call.target())),
        }
    }

    fn single_struct_type_argument(call: &MoveCall) -> Result<StructTag, String> {
        match call.type_arguments.as_slice() {
            [TypeTag::Struct(item)] => Ok((**item).clone()),
            _ => Err(format!(
                "{} expects exactly one struct type argument",
                call.target()
            )),
        }
    }

    fn new_policy(&mut self, call: &MoveCall) -> Result<Vec<Value>, String> {
        let item = Self::single_struct_type_argument(call)?;
        let [publisher] = call.arguments.as_slice() else {
            return Err("transfer_policy::new expects one argument".to_string());
        };
        let publisher = self.resolve_object(*publisher)?;
        self.expect_type(&publisher, &publisher_type())?;
        let origin = self.object_type(&publisher).and_then(|(_, origin)| origin);
        if origin != Some(item.address) {
            return Err(format!("publisher does not belong to the package of {item}"));
        }

        let policy = self.create(transfer_policy_type(&item), None, None);
        let cap = self.create(transfer_policy_cap_type(&item), None, None);
        Ok(vec![Value::Object(policy), Value::Object(cap)])
    }

    fn add_rule(&mut self, call: &MoveCall) -> Result<Vec<Value>, String> {
        let item = Self::single_struct_type_argument(call)?;
        let (policy, cap, config) = match call.arguments.as_slice() {
            [policy, cap, config @ ..] => (*policy, *cap, config),
            _ => return Err(format!("{} expects a policy and a cap", call.target())),
        };
        let policy = self.resolve_object(policy)?;
        self.expect_type(&policy, &transfer_policy_type(&item))?;
        let cap = self.resolve_object(cap)?;
        self.expect_type(&cap, &transfer_policy_cap_type(&item))?;

        match (call.module.as_str(), config) {
            ("royalty_rule", [basis_points, min_amount]) => {
                let basis_points = self.resolve_pure(*basis_points)?;
                let min_amount = self.resolve_pure(*min_amount)?;
                let basis_points: [u8; 2] = basis_points
                    .try_into()
                    .map_err(|_| "basis points must be a u16".to_string())?;
                if min_amount.len() != 8 {
                    return Err("minimum amount must be a u64".to_string());
                }
                if u64::from(u16::from_le_bytes(basis_points)) > MAX_BASIS_POINTS {
                    return Err("basis points out of range".to_string());
                }
                Ok(vec![])
            }
            ("kiosk_lock_rule" | "personal_kiosk_rule", []) => Ok(vec![]),
            _ => Err(format!("wrong number of arguments for {}", call.target())),
        }
    }

    fn share(&mut self, call: &MoveCall) -> Result<Vec<Value>, String> {
        let shared_type = Self::single_struct_type_argument(call)?;
        let [object] = call.arguments.as_slice() else {
            return Err("public_share_object expects one argument".to_string());
        };
        let object = self.resolve_object(*object)?;
        self.expect_type(&object, &shared_type)?;
        let owner = Owner::Shared {
            initial_shared_version: self.version,
        };
        self.set_owner(&object, owner)?;
        Ok(vec![])
    }

    fn transfer(&mut self, objects: &[Argument], recipient: Argument) -> Result<Vec<Value>, String> {
        let recipient: [u8; 32] = self
            .resolve_pure(recipient)?
            .try_into()
            .map_err(|_| "recipient must be a 32-byte address".to_string())?;
        for object in objects {
            let object = self.resolve_object(*object)?;
            self.set_owner(&object, Owner::AddressOwner(SuiAddress::new(recipient)))?;
        }
        Ok(vec![])
    }

    fn finish(self) -> Result<Outcome, String> {
        if let Some(unused) = self.created.iter().find(|new| new.owner.is_none()) {
            return Err(format!(
                "unused value without drop: {}",
                unused.object_type
            ));
        }
        Ok(Outcome {
            version: self.version,
            published: self.published,
            created: self.created,
            touched: self.touched,
        })
    }
}

impl Outcome {
    /// Apply the writes and return them as object changes.
    pub fn commit(self, world: &mut WorldState) -> Vec<ObjectChange> {
        let mut changes = Vec::new();

        for (package_id, modules) in self.published {
            let id = ObjectId::from(package_id);
            changes.push(ObjectChange::Published {
                package_id,
                version: SequenceNumber(1),
                digest: object_digest(&id, SequenceNumber(1)),
                modules,
            });
            world.packages.insert(package_id);
        }

        for new in self.created {
            let Some(owner) = new.owner else {
                continue;
            };
            let live = LiveObject {
                object_type: new.object_type,
                owner,
                version: self.version,
                digest: object_digest(&new.id, self.version),
                origin: new.origin,
            };
            changes.push(ObjectChange::Created {
                object_id: new.id,
                object_type: live.object_type.clone(),
                owner,
                version: live.version,
                digest: live.digest,
            });
            world.objects.insert(new.id, live);
        }

        for (id, mut live) in self.touched {
            live.version = self.version;
            live.digest = object_digest(&id, self.version);
            changes.push(ObjectChange::Mutated {
                object_id: id,
                object_type: live.object_type.clone(),
                owner: live.owner,
                version: live.version,
                digest: live.digest,
            });
            world.objects.insert(id, live);
        }

        changes
    }
}

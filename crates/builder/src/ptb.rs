//! Incremental assembly of programmable transactions.

use crate::TransactionBuildError;
use kiosk_provisioner_types::{
    Argument, CallArg, Command, MoveCall, ObjectRef, PackageId, ProgrammableTransaction,
    SuiAddress, TypeTag,
};

/// Appends inputs and commands, handing back the [`Argument`] that refers to
/// each one so later commands can consume it.
#[derive(Debug, Default)]
pub struct ProgrammableTransactionBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl ProgrammableTransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn input(&mut self, arg: CallArg) -> Result<Argument, TransactionBuildError> {
        let index = u16::try_from(self.inputs.len())
            .map_err(|_| TransactionBuildError::Overflow { what: "inputs" })?;
        self.inputs.push(arg);
        Ok(Argument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> Result<u16, TransactionBuildError> {
        let index = u16::try_from(self.commands.len())
            .map_err(|_| TransactionBuildError::Overflow { what: "commands" })?;
        self.commands.push(command);
        Ok(index)
    }

    /// Add a command and return the argument naming its result.
    pub fn command(&mut self, command: Command) -> Result<Argument, TransactionBuildError> {
        self.push_command(command).map(Argument::Result)
    }

    /// Little-endian `u16` input.
    pub fn pure_u16(&mut self, value: u16) -> Result<Argument, TransactionBuildError> {
        self.input(CallArg::Pure(value.to_le_bytes().to_vec()))
    }

    /// Little-endian `u64` input.
    pub fn pure_u64(&mut self, value: u64) -> Result<Argument, TransactionBuildError> {
        self.input(CallArg::Pure(value.to_le_bytes().to_vec()))
    }

    /// 32-byte address input.
    pub fn pure_address(&mut self, address: SuiAddress) -> Result<Argument, TransactionBuildError> {
        self.input(CallArg::Pure(address.as_bytes().to_vec()))
    }

    /// Owned object input.
    pub fn object(&mut self, object_ref: ObjectRef) -> Result<Argument, TransactionBuildError> {
        self.input(CallArg::Object(object_ref))
    }

    pub fn publish(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<PackageId>,
    ) -> Result<Argument, TransactionBuildError> {
        self.command(Command::Publish(modules, dependencies))
    }

    pub fn move_call(
        &mut self,
        package: PackageId,
        module: &str,
        function: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<Argument, TransactionBuildError> {
        self.command(Command::MoveCall(Box::new(MoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))
    }

    /// Move call returning a two-element tuple, split into its elements.
    pub fn move_call_pair(
        &mut self,
        package: PackageId,
        module: &str,
        function: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<(Argument, Argument), TransactionBuildError> {
        let index = self.push_command(Command::MoveCall(Box::new(MoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))?;
        Ok((
            Argument::NestedResult(index, 0),
            Argument::NestedResult(index, 1),
        ))
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        recipient: Argument,
    ) -> Result<Argument, TransactionBuildError> {
        self.command(Command::TransferObjects(objects, recipient))
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_index_inputs_and_commands_separately() {
        let mut ptb = ProgrammableTransactionBuilder::new();
        let sender = ptb.pure_address(SuiAddress::new([7u8; 32])).unwrap();
        let amount = ptb.pure_u64(5).unwrap();
        let publish = ptb.publish(vec![vec![1]], vec![]).unwrap();
        let transfer = ptb.transfer_objects(vec![publish], sender).unwrap();

        assert_eq!(sender, Argument::Input(0));
        assert_eq!(amount, Argument::Input(1));
        assert_eq!(publish, Argument::Result(0));
        assert_eq!(transfer, Argument::Result(1));

        let pt = ptb.finish();
        assert_eq!(pt.inputs[1], CallArg::Pure(vec![5, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(pt.commands.len(), 2);
    }

    #[test]
    fn test_move_call_pair_splits_result() {
        let mut ptb = ProgrammableTransactionBuilder::new();
        ptb.publish(vec![vec![1]], vec![]).unwrap();
        let (first, second) = ptb
            .move_call_pair(PackageId::SUI_FRAMEWORK, "m", "f", vec![], vec![])
            .unwrap();
        assert_eq!(first, Argument::NestedResult(1, 0));
        assert_eq!(second, Argument::NestedResult(1, 1));
    }

    #[test]
    fn test_pure_encodings() {
        let mut ptb = ProgrammableTransactionBuilder::new();
        ptb.pure_u16(0x0102).unwrap();
        ptb.pure_address(SuiAddress::new([3u8; 32])).unwrap();
        let pt = ptb.finish();

        assert_eq!(pt.inputs[0], CallArg::Pure(vec![0x02, 0x01]));
        assert_eq!(pt.inputs[1], CallArg::Pure(vec![3u8; 32]));
    }
}

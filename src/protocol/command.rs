//! Command opcodes and the operation catalog for the ProXR protocol.
//!
//! Plain commands are `0xFE <opcode> <operands...>`. Timer and setup commands
//! live behind a second start byte: `0xFE 0x32 <opcode> <operands...>`.
//!
//! Every operation the client can issue is described once, as a constant
//! [`Operation`] in [`ops`]. The command handler treats all of them through
//! the same encode/send/interpret pipeline and only varies the fields below.

use std::ops::RangeInclusive;

/// Plain (non-extended) command opcodes.
///
/// Families addressed by port or timer are listed with their base value; the
/// wire opcode is `base + index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandOpcode {
    // Individual relays, current bank (base + port - 1)
    /// Turn off relay.
    TurnOffRelay = 0,
    /// Turn on relay.
    TurnOnRelay = 8,
    /// Query relay status.
    QueryRelayStatus = 16,

    // Current bank
    /// Query status of all relays in the current bank.
    QueryStatusAll = 24,
    /// Enable automatic relay refreshing.
    EnableAutomaticRefreshing = 25,
    /// Disable automatic relay refreshing.
    DisableAutomaticRefreshing = 26,
    /// Enable reporting mode.
    EnableReportingMode = 27,
    /// Disable reporting mode.
    DisableReportingMode = 28,
    /// Turn all relays in the current bank on.
    AllRelaysOn = 29,
    /// Turn all relays in the current bank off.
    AllRelaysOff = 30,
    /// Invert all relays in the current bank.
    ToggleAllRelays = 31,
    /// Reverse the bit order of the current bank.
    ReverseAllRelays = 32,
    /// Test two-way communications.
    TestComms = 33,
    /// Query the currently selected bank.
    QuerySelectedBank = 34,
    /// Store the relay refreshing mode as the power-up default.
    StoreRefreshMode = 35,
    /// Query the relay refreshing mode.
    QueryRefreshMode = 36,
    /// Refresh relays now.
    RefreshRelays = 37,
    /// Write a status byte to the current bank.
    SetRelayStatus = 40,
    /// Store the current bank's relay pattern as power-up default.
    StorePowerUpDefaults = 42,
    /// Query the current bank's power-up default.
    QueryPowerUpDefaults = 43,
    /// Select the active bank.
    SelectBank = 49,
    /// Second start byte for extended commands.
    Extended = 50,

    // Individual relays, explicit bank (base + port - 1, bank)
    /// Turn off relay in bank.
    TurnOffBankRelay = 100,
    /// Turn on relay in bank.
    TurnOnBankRelay = 108,
    /// Query relay status in bank.
    QueryBankRelayStatus = 116,

    // Whole banks
    /// Query status of a bank (0 = all banks).
    QueryBankStatus = 124,
    /// Turn all relays in bank on.
    BankRelaysOn = 129,
    /// Turn all relays in bank off.
    BankRelaysOff = 130,
    /// Invert all relays in bank.
    ToggleBankRelays = 131,
    /// Reverse the bit order of a bank.
    ReverseBankRelays = 132,
    /// Write a status byte to a bank.
    SetBankRelayStatus = 140,
    /// Store power-up default for a bank (0 = all banks).
    StoreBankPowerUpDefaults = 142,
    /// Query power-up default for a bank (0 = all banks).
    QueryBankPowerUpDefaults = 143,

    // E3C device addressing
    /// Report device identification.
    RecallDeviceIdentification = 246,
    /// Report the stored device number.
    RecallDeviceNumber = 247,
    /// All devices listen.
    EnableAllDevices = 248,
    /// All devices ignore.
    DisableAllDevices = 249,
    /// Selected device listens.
    EnableSelectedDevice = 250,
    /// Selected device ignores.
    DisableSelectedDevice = 251,
    /// Selected device listens, all others ignore.
    EnableSelectedDeviceExclusive = 252,
    /// Selected device ignores, all others listen.
    DisableSelectedDeviceExclusive = 253,
    /// Store the device number.
    StoreDeviceNumber = 255,
}

impl From<CommandOpcode> for u8 {
    fn from(cmd: CommandOpcode) -> Self {
        cmd as Self
    }
}

/// Extended command opcodes (sent after `0xFE 0x32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExtendedOpcode {
    /// Set up and run a duration timer (base + timer index).
    DurationTimer = 50,
    /// Set up and run a pulse timer (base + timer index).
    PulseTimer = 70,
    /// Report remaining time of a timer.
    QueryTimer = 130,
    /// Turn timers on or off with a 16-bit mask.
    ControlActiveTimers = 131,
    /// Set the timer calibration value.
    SetTimerCalibration = 132,
    /// Query the timer calibration value.
    QueryTimerCalibration = 133,
    /// Set REPS.
    SetReps = 134,
    /// Query REPS.
    QueryReps = 135,
    /// Set the inter-character delay.
    SetCharacterDelay = 136,
    /// Query the inter-character delay.
    QueryCharacterDelay = 137,
    /// Set the number of attached banks.
    SetAttachedBanks = 138,
    /// Query the number of attached banks.
    QueryAttachedBanks = 139,
    /// Restore factory defaults.
    FactoryReset = 140,
    /// Recover safe communication parameters.
    RecoverSafeParameters = 142,
}

impl From<ExtendedOpcode> for u8 {
    fn from(cmd: ExtendedOpcode) -> Self {
        cmd as Self
    }
}

/// Number of fixed bytes in the all-banks power-up defaults snapshot.
pub const ALL_BANKS_POWER_UP_LEN: usize = 26;

/// Reply length when a bank-0 (all banks) query is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllBanksReply {
    /// One byte per attached bank.
    PerAttachedBank,
    /// A fixed number of bytes.
    Fixed(usize),
}

/// Reply shape declared by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Single ACK byte.
    Ack,
    /// Single byte, accepted whatever its value.
    AnyByte,
    /// Fixed-length data reply.
    Data(usize),
    /// One byte for a single bank, `all_banks` when bank 0 is queried.
    BankData { all_banks: AllBanksReply },
}

/// What the interpreter should read and how to judge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// One byte equal to the ACK value.
    Ack,
    /// One byte of any value.
    AnyByte,
    /// Exactly this many bytes.
    Bytes(usize),
}

impl Expect {
    /// Number of bytes read from the transport.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Ack | Self::AnyByte => 1,
            Self::Bytes(n) => n,
        }
    }

    /// Returns true if no bytes are expected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl ReplyShape {
    /// Resolves the reply for a call addressed to a single bank, or to none.
    #[must_use]
    pub const fn single(self) -> Expect {
        match self {
            Self::Ack => Expect::Ack,
            Self::AnyByte => Expect::AnyByte,
            Self::Data(n) => Expect::Bytes(n),
            Self::BankData { .. } => Expect::Bytes(1),
        }
    }

    /// Resolves the reply for a call addressed to `bank`.
    #[must_use]
    pub const fn resolve(self, bank: u8, attached_banks: u8) -> Expect {
        match self {
            Self::BankData {
                all_banks: AllBanksReply::PerAttachedBank,
            } if bank == 0 => Expect::Bytes(attached_banks as usize),
            Self::BankData {
                all_banks: AllBanksReply::Fixed(n),
            } if bank == 0 => Expect::Bytes(n),
            _ => self.single(),
        }
    }
}

/// Whether bank 0 ("all banks") is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankPolicy {
    /// The operation takes no bank operand.
    None,
    /// Bank must be 1..=attached banks.
    Explicit,
    /// Bank 0 means all banks.
    WildcardAllowed,
}

/// A single device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Human-readable name, used in logs.
    pub name: &'static str,
    /// Opcode, or band base for indexed families.
    pub opcode: u8,
    /// Number of consecutive opcodes the family occupies.
    pub width: u8,
    /// Sent behind the extended start byte.
    pub extended: bool,
    /// Declared reply.
    pub reply: ReplyShape,
    /// Bank operand policy.
    pub bank: BankPolicy,
}

impl Operation {
    const fn plain(name: &'static str, opcode: CommandOpcode, reply: ReplyShape) -> Self {
        Self {
            name,
            opcode: opcode as u8,
            width: 1,
            extended: false,
            reply,
            bank: BankPolicy::None,
        }
    }

    const fn extended(name: &'static str, opcode: ExtendedOpcode, reply: ReplyShape) -> Self {
        Self {
            name,
            opcode: opcode as u8,
            width: 1,
            extended: true,
            reply,
            bank: BankPolicy::None,
        }
    }

    const fn width(mut self, width: u8) -> Self {
        self.width = width;
        self
    }

    const fn bank(mut self, bank: BankPolicy) -> Self {
        self.bank = bank;
        self
    }

    /// Range of wire opcodes this operation can produce.
    #[must_use]
    pub const fn band(&self) -> RangeInclusive<u8> {
        self.opcode..=self.opcode + (self.width - 1)
    }

    /// Looks up an operation by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Self> {
        ops::ALL.iter().find(|op| op.name == name)
    }
}

/// The operation catalog.
pub mod ops {
    use super::{
        ALL_BANKS_POWER_UP_LEN, AllBanksReply, BankPolicy, CommandOpcode as C,
        ExtendedOpcode as X, Operation, ReplyShape,
    };

    const ACK: ReplyShape = ReplyShape::Ack;
    const BYTE: ReplyShape = ReplyShape::Data(1);

    // E3C device addressing
    pub const ENABLE_ALL_DEVICES: Operation =
        Operation::plain("enable all devices", C::EnableAllDevices, ACK);
    pub const DISABLE_ALL_DEVICES: Operation =
        Operation::plain("disable all devices", C::DisableAllDevices, ACK);
    pub const ENABLE_SELECTED_DEVICE: Operation =
        Operation::plain("enable selected device", C::EnableSelectedDevice, ACK);
    pub const DISABLE_SELECTED_DEVICE: Operation =
        Operation::plain("disable selected device", C::DisableSelectedDevice, ACK);
    pub const ENABLE_SELECTED_DEVICE_EXCLUSIVE: Operation = Operation::plain(
        "enable selected device exclusive",
        C::EnableSelectedDeviceExclusive,
        ACK,
    );
    pub const DISABLE_SELECTED_DEVICE_EXCLUSIVE: Operation = Operation::plain(
        "disable selected device exclusive",
        C::DisableSelectedDeviceExclusive,
        ACK,
    );
    pub const STORE_DEVICE_NUMBER: Operation =
        Operation::plain("store device number", C::StoreDeviceNumber, ACK);
    pub const RECALL_DEVICE_IDENTIFICATION: Operation = Operation::plain(
        "recall device identification",
        C::RecallDeviceIdentification,
        ReplyShape::Data(4),
    );
    pub const RECALL_DEVICE_NUMBER: Operation =
        Operation::plain("recall device number", C::RecallDeviceNumber, BYTE);

    // Individual relays
    pub const TURN_OFF_RELAY: Operation =
        Operation::plain("turn off relay", C::TurnOffRelay, ACK).width(8);
    pub const TURN_ON_RELAY: Operation =
        Operation::plain("turn on relay", C::TurnOnRelay, ACK).width(8);
    pub const QUERY_RELAY_STATUS: Operation =
        Operation::plain("query relay status", C::QueryRelayStatus, BYTE).width(8);
    pub const TURN_OFF_BANK_RELAY: Operation =
        Operation::plain("turn off bank relay", C::TurnOffBankRelay, ACK)
            .width(8)
            .bank(BankPolicy::Explicit);
    pub const TURN_ON_BANK_RELAY: Operation =
        Operation::plain("turn on bank relay", C::TurnOnBankRelay, ACK)
            .width(8)
            .bank(BankPolicy::Explicit);
    pub const QUERY_BANK_RELAY_STATUS: Operation =
        Operation::plain("query bank relay status", C::QueryBankRelayStatus, BYTE)
            .width(8)
            .bank(BankPolicy::Explicit);

    // Current bank
    pub const QUERY_STATUS_ALL: Operation =
        Operation::plain("query status all", C::QueryStatusAll, BYTE);
    pub const ALL_RELAYS_ON: Operation = Operation::plain("all relays on", C::AllRelaysOn, ACK);
    pub const ALL_RELAYS_OFF: Operation = Operation::plain("all relays off", C::AllRelaysOff, ACK);
    pub const TOGGLE_ALL_RELAYS: Operation =
        Operation::plain("toggle all relays", C::ToggleAllRelays, ACK);
    pub const REVERSE_ALL_RELAYS: Operation =
        Operation::plain("reverse all relays", C::ReverseAllRelays, ACK);
    pub const SET_RELAY_STATUS: Operation =
        Operation::plain("set relay status", C::SetRelayStatus, ACK);
    pub const STORE_POWER_UP_DEFAULTS: Operation =
        Operation::plain("store power-up defaults", C::StorePowerUpDefaults, ACK);
    pub const QUERY_POWER_UP_DEFAULTS: Operation =
        Operation::plain("query power-up defaults", C::QueryPowerUpDefaults, BYTE);

    // Whole banks
    pub const QUERY_BANK_STATUS: Operation = Operation::plain(
        "query bank status",
        C::QueryBankStatus,
        ReplyShape::BankData {
            all_banks: AllBanksReply::PerAttachedBank,
        },
    )
    .bank(BankPolicy::WildcardAllowed);
    pub const BANK_RELAYS_ON: Operation =
        Operation::plain("bank relays on", C::BankRelaysOn, ACK).bank(BankPolicy::Explicit);
    pub const BANK_RELAYS_OFF: Operation =
        Operation::plain("bank relays off", C::BankRelaysOff, ACK).bank(BankPolicy::Explicit);
    pub const TOGGLE_BANK_RELAYS: Operation =
        Operation::plain("toggle bank relays", C::ToggleBankRelays, ACK)
            .bank(BankPolicy::Explicit);
    pub const REVERSE_BANK_RELAYS: Operation =
        Operation::plain("reverse bank relays", C::ReverseBankRelays, ACK)
            .bank(BankPolicy::Explicit);
    pub const SET_BANK_RELAY_STATUS: Operation =
        Operation::plain("set bank relay status", C::SetBankRelayStatus, ACK)
            .bank(BankPolicy::WildcardAllowed);
    pub const STORE_BANK_POWER_UP_DEFAULTS: Operation = Operation::plain(
        "store bank power-up defaults",
        C::StoreBankPowerUpDefaults,
        ACK,
    )
    .bank(BankPolicy::WildcardAllowed);
    pub const QUERY_BANK_POWER_UP_DEFAULTS: Operation = Operation::plain(
        "query bank power-up defaults",
        C::QueryBankPowerUpDefaults,
        ReplyShape::BankData {
            all_banks: AllBanksReply::Fixed(ALL_BANKS_POWER_UP_LEN),
        },
    )
    .bank(BankPolicy::WildcardAllowed);
    pub const SELECT_BANK: Operation =
        Operation::plain("select bank", C::SelectBank, ACK).bank(BankPolicy::Explicit);
    pub const QUERY_SELECTED_BANK: Operation =
        Operation::plain("query selected bank", C::QuerySelectedBank, BYTE);

    // Device configuration
    pub const ENABLE_REPORTING_MODE: Operation =
        Operation::plain("enable reporting mode", C::EnableReportingMode, ACK);
    pub const DISABLE_REPORTING_MODE: Operation =
        Operation::plain("disable reporting mode", C::DisableReportingMode, ACK);
    pub const TEST_COMMS: Operation = Operation::plain("test comms", C::TestComms, ACK);
    pub const ENABLE_AUTOMATIC_REFRESHING: Operation = Operation::plain(
        "enable automatic refreshing",
        C::EnableAutomaticRefreshing,
        ACK,
    );
    pub const DISABLE_AUTOMATIC_REFRESHING: Operation = Operation::plain(
        "disable automatic refreshing",
        C::DisableAutomaticRefreshing,
        ACK,
    );
    pub const STORE_REFRESH_MODE: Operation =
        Operation::plain("store refresh mode", C::StoreRefreshMode, ACK);
    pub const QUERY_REFRESH_MODE: Operation =
        Operation::plain("query refresh mode", C::QueryRefreshMode, BYTE);
    pub const REFRESH_RELAYS: Operation =
        Operation::plain("refresh relays", C::RefreshRelays, ACK);

    // Extended: timers
    pub const DURATION_TIMER: Operation =
        Operation::extended("duration timer", X::DurationTimer, ACK).width(16);
    pub const PULSE_TIMER: Operation =
        Operation::extended("pulse timer", X::PulseTimer, ACK).width(16);
    pub const QUERY_TIMER: Operation =
        Operation::extended("query timer", X::QueryTimer, ReplyShape::Data(3));
    pub const CONTROL_ACTIVE_TIMERS: Operation =
        Operation::extended("control active timers", X::ControlActiveTimers, ACK);

    // Extended: setup
    pub const SET_TIMER_CALIBRATION: Operation =
        Operation::extended("set timer calibration", X::SetTimerCalibration, ACK);
    pub const QUERY_TIMER_CALIBRATION: Operation = Operation::extended(
        "query timer calibration",
        X::QueryTimerCalibration,
        ReplyShape::Data(2),
    );
    pub const SET_REPS: Operation = Operation::extended("set reps", X::SetReps, ACK);
    pub const QUERY_REPS: Operation = Operation::extended("query reps", X::QueryReps, BYTE);
    pub const SET_CHARACTER_DELAY: Operation =
        Operation::extended("set character delay", X::SetCharacterDelay, ACK);
    pub const QUERY_CHARACTER_DELAY: Operation =
        Operation::extended("query character delay", X::QueryCharacterDelay, BYTE);
    // The device's reply to this command is not a reliable ACK; any byte is accepted.
    pub const SET_ATTACHED_BANKS: Operation = Operation::extended(
        "set attached banks",
        X::SetAttachedBanks,
        ReplyShape::AnyByte,
    );
    pub const QUERY_ATTACHED_BANKS: Operation =
        Operation::extended("query attached banks", X::QueryAttachedBanks, BYTE);
    pub const FACTORY_RESET: Operation =
        Operation::extended("factory reset", X::FactoryReset, ACK);
    pub const RECOVER_SAFE_PARAMETERS: Operation =
        Operation::extended("recover safe parameters", X::RecoverSafeParameters, ACK);

    /// Every operation, for lookup by name.
    pub const ALL: &[Operation] = &[
        ENABLE_ALL_DEVICES,
        DISABLE_ALL_DEVICES,
        ENABLE_SELECTED_DEVICE,
        DISABLE_SELECTED_DEVICE,
        ENABLE_SELECTED_DEVICE_EXCLUSIVE,
        DISABLE_SELECTED_DEVICE_EXCLUSIVE,
        STORE_DEVICE_NUMBER,
        RECALL_DEVICE_IDENTIFICATION,
        RECALL_DEVICE_NUMBER,
        TURN_OFF_RELAY,
        TURN_ON_RELAY,
        QUERY_RELAY_STATUS,
        TURN_OFF_BANK_RELAY,
        TURN_ON_BANK_RELAY,
        QUERY_BANK_RELAY_STATUS,
        QUERY_STATUS_ALL,
        ALL_RELAYS_ON,
        ALL_RELAYS_OFF,
        TOGGLE_ALL_RELAYS,
        REVERSE_ALL_RELAYS,
        SET_RELAY_STATUS,
        STORE_POWER_UP_DEFAULTS,
        QUERY_POWER_UP_DEFAULTS,
        QUERY_BANK_STATUS,
        BANK_RELAYS_ON,
        BANK_RELAYS_OFF,
        TOGGLE_BANK_RELAYS,
        REVERSE_BANK_RELAYS,
        SET_BANK_RELAY_STATUS,
        STORE_BANK_POWER_UP_DEFAULTS,
        QUERY_BANK_POWER_UP_DEFAULTS,
        SELECT_BANK,
        QUERY_SELECTED_BANK,
        ENABLE_REPORTING_MODE,
        DISABLE_REPORTING_MODE,
        TEST_COMMS,
        ENABLE_AUTOMATIC_REFRESHING,
        DISABLE_AUTOMATIC_REFRESHING,
        STORE_REFRESH_MODE,
        QUERY_REFRESH_MODE,
        REFRESH_RELAYS,
        DURATION_TIMER,
        PULSE_TIMER,
        QUERY_TIMER,
        CONTROL_ACTIVE_TIMERS,
        SET_TIMER_CALIBRATION,
        QUERY_TIMER_CALIBRATION,
        SET_REPS,
        QUERY_REPS,
        SET_CHARACTER_DELAY,
        QUERY_CHARACTER_DELAY,
        SET_ATTACHED_BANKS,
        QUERY_ATTACHED_BANKS,
        FACTORY_RESET,
        RECOVER_SAFE_PARAMETERS,
    ];
}

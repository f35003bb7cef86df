//! # Record Schema
//!
//! Composes the primitive field rules with the document-variant rules into
//! one validator for the whole [`Record`], plus one validator per wizard
//! section.
//!
//! ## Discriminants first
//!
//! Two tags decide which rules apply: `isMoralEntity` and `document.type`.
//! Each is checked before anything that depends on it. An absent or
//! unknown `document.type` yields exactly one `DiscriminantInvalid` at
//! `document.type` and no variant-specific error (number, postfix,
//! validity date, images). An absent `isMoralEntity` yields one
//! `DiscriminantInvalid` at `isMoralEntity` and suppresses the checks that
//! depend on the entity kind (first name, gender, NUI pattern).
//!
//! ## Messages
//!
//! Every message is the translation of a `kycForm.errors.*` key.

use chrono::{Local, NaiveDate};
use kyc_core::path::paths;
use kyc_core::{
    ContractStatus, CustomerStatus, DocumentType, EntityKind, ErrorKind, FieldErrors, FieldPath,
    FileRef, Gender, Location, MeterDraft, MeterStatus, MeterType, PhoneEntry, Record, Translate,
    UsageType,
};
use kyc_core::{
    Contract, IdentityDocument, MeterDetails, NuiDocument, OtherContract, Postfix,
    PostfixedDocument, RegisterDocument, ValidRecord,
};
use tracing::debug;

use crate::rules::{check, date_within, earliest_birth_date, present, Failure, Pattern};
use crate::variant::{resolve, NuiPattern, VariantRules};

/// Message keys used by the schema.
pub mod keys {
    pub const REQUIRED: &str = "kycForm.errors.required";
    pub const INVALID_NAME: &str = "kycForm.errors.invalidName";
    pub const REQUIRED_DATE: &str = "kycForm.errors.requiredDate";
    pub const INVALID_DATE: &str = "kycForm.errors.invalidDate";
    pub const GENDER_ENTITY_MISMATCH: &str = "kycForm.errors.gender.entityMismatch";

    pub const TYPE_INVALID: &str = "kycForm.errors.type.invalid";
    pub const TYPE_ENTITY_MISMATCH: &str = "kycForm.errors.type.entityMismatch";
    pub const POSTFIX_POST: &str = "kycForm.errors.postfix.post";
    pub const POSTFIX_CODE: &str = "kycForm.errors.postfix.code";
    pub const VALIDITY_DATE_REQUIRED: &str = "kycForm.errors.validityDate.required";
    pub const FRONT_IMAGE_REQUIRED: &str = "kycForm.errors.frontImageRequired";
    pub const BACK_IMAGE_REQUIRED: &str = "kycForm.errors.backImageRequired";

    pub const NUI_REQUIRED: &str = "kycForm.errors.nui.required";
    pub const NUI_LENGTH: &str = "kycForm.errors.nui.length";
    pub const NUI_FILE_REQUIRED: &str = "kycForm.errors.nui.fileRequired";

    pub const PHONE_INVALID: &str = "kycForm.errors.phone.invalid";
    pub const PHONE_MIN: &str = "kycForm.errors.phone.min";
    pub const INVALID_EMAIL: &str = "kycForm.errors.invalidEmail";

    pub const CONTRACT_NUMBER_REQUIRED: &str = "kycForm.errors.contract.numberRequired";
    pub const CONTRACT_INVALID: &str = "kycForm.errors.contract.invalid";
    pub const CONTRACT_NOT_FOUND: &str = "kycForm.errors.contract.notFound";
    pub const CONTRACT_VERIFICATION_FAILED: &str = "kycForm.errors.contract.verificationFailed";
    pub const METER_DETAILS_UNEXPECTED: &str = "kycForm.errors.meterDetails.unexpected";
    pub const OTHER_CONTRACTS_UNEXPECTED: &str = "kycForm.errors.otherContracts.unexpected";

    pub const FILL_ALL: &str = "kycForm.errors.fillAll";
}

/// Maximum length of a NUI number.
pub const NUI_MAX_CHARS: usize = 14;

/// The composed validator for KYC records.
#[derive(Debug, Clone)]
pub struct RecordSchema<T> {
    translate: T,
    today: Option<NaiveDate>,
}

// Section outputs, assembled into a ValidRecord when every section passes.
struct Personal {
    is_moral: bool,
    first_name: Option<String>,
    last_name: String,
    gender: Gender,
    date_of_birth: NaiveDate,
}

struct Identity {
    document: IdentityDocument,
    nui: NuiDocument,
}

struct Contact {
    phone_numbers: Vec<PhoneEntry>,
    location: Location,
    email: String,
}

struct ContractSection {
    contract: Contract,
    other_contracts: Vec<OtherContract>,
}

impl<T: Translate> RecordSchema<T> {
    pub fn new(translate: T) -> Self {
        Self {
            translate,
            today: None,
        }
    }

    /// Pin "today" for the date-of-birth upper bound.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn translator(&self) -> &T {
        &self.translate
    }

    pub fn message(&self, key: &str) -> String {
        self.translate.translate(key)
    }

    /// The headline shown above a list of field errors.
    pub fn summary_message(&self) -> String {
        self.message(keys::FILL_ALL)
    }

    fn report(&self, errors: &mut FieldErrors, path: impl Into<FieldPath>, failure: Failure) {
        let message = self.message(&failure.key);
        errors.add(path, failure.kind, message);
    }

    fn report_kind(
        &self,
        errors: &mut FieldErrors,
        path: impl Into<FieldPath>,
        kind: ErrorKind,
        key: &str,
    ) {
        self.report(errors, path, Failure::new(kind, key));
    }

    /// Run a check and report its failure under `path`.
    fn expect_ok(
        &self,
        errors: &mut FieldErrors,
        path: impl Into<FieldPath>,
        result: Result<(), Failure>,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(failure) => {
                self.report(errors, path, failure);
                false
            }
        }
    }

    fn expect_some<V>(
        &self,
        errors: &mut FieldErrors,
        path: impl Into<FieldPath>,
        result: Result<V, Failure>,
    ) -> Option<V> {
        match result {
            Ok(v) => Some(v),
            Err(failure) => {
                self.report(errors, path, failure);
                None
            }
        }
    }

    // ─── Full record ─────────────────────────────────────────────────

    /// Validate the whole record.
    ///
    /// Returns the narrowed record, or every field error found across all
    /// sections.
    pub fn validate(&self, record: &Record) -> Result<ValidRecord, FieldErrors> {
        let mut errors = FieldErrors::new();
        let entity = self.entity_kind(record, &mut errors);

        let personal = self.parse_personal(record, entity, &mut errors);
        let identity = self.parse_identity(record, entity, &mut errors);
        let contact = self.parse_contact(record, &mut errors);
        let contract = self.parse_contract(record, &mut errors);

        debug!(errors = errors.len(), "record validated");

        match (personal, identity, contact, contract) {
            (Some(p), Some(i), Some(c), Some(k)) if errors.is_empty() => Ok(ValidRecord {
                is_moral_entity: p.is_moral,
                first_name: p.first_name,
                last_name: p.last_name,
                gender: p.gender,
                date_of_birth: p.date_of_birth,
                document: i.document,
                nui_document: i.nui,
                phone_numbers: c.phone_numbers,
                location: c.location,
                email: c.email,
                contract: k.contract,
                other_contracts: k.other_contracts,
            }),
            _ => Err(errors),
        }
    }

    // ─── Sections ────────────────────────────────────────────────────

    /// Personal information, with the entity kind read from the record.
    pub fn personal(&self, record: &Record) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let entity = self.entity_kind(record, &mut errors);
        self.parse_personal(record, entity, &mut errors);
        errors.into_result(())
    }

    /// Personal information under an explicit entity kind.
    pub fn personal_for(&self, record: &Record, entity: EntityKind) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.parse_personal(record, Some(entity), &mut errors);
        errors.into_result(())
    }

    /// Identity document and NUI, with the entity kind read from the record.
    pub fn identity(&self, record: &Record) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.parse_identity(record, record.is_moral_entity.map(EntityKind::from_flag), &mut errors);
        errors.into_result(())
    }

    /// Identity document and NUI under an explicit entity kind.
    pub fn identity_for(&self, record: &Record, entity: EntityKind) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.parse_identity(record, Some(entity), &mut errors);
        errors.into_result(())
    }

    /// Phone numbers, email and location.
    pub fn contact(&self, record: &Record) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.parse_contact(record, &mut errors);
        errors.into_result(())
    }

    /// Primary contract, meter and other contracts. Synchronous rules only.
    pub fn contract(&self, record: &Record) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.parse_contract(record, &mut errors);
        errors.into_result(())
    }

    fn entity_kind(&self, record: &Record, errors: &mut FieldErrors) -> Option<EntityKind> {
        match record.is_moral_entity {
            Some(flag) => Some(EntityKind::from_flag(flag)),
            None => {
                self.report_kind(
                    errors,
                    paths::IS_MORAL_ENTITY,
                    ErrorKind::DiscriminantInvalid,
                    keys::REQUIRED,
                );
                None
            }
        }
    }

    fn parse_personal(
        &self,
        record: &Record,
        entity: Option<EntityKind>,
        errors: &mut FieldErrors,
    ) -> Option<Personal> {
        let before = errors.len();

        self.expect_ok(
            errors,
            paths::LAST_NAME,
            check(&record.last_name)
                .required(keys::REQUIRED)
                .pattern(Pattern::Name, keys::INVALID_NAME)
                .finish(),
        );

        let date_of_birth = self
            .expect_some(
                errors,
                paths::DATE_OF_BIRTH,
                present(record.date_of_birth, keys::REQUIRED_DATE),
            )
            .and_then(|date| {
                self.expect_some(
                    errors,
                    paths::DATE_OF_BIRTH,
                    date_within(date, earliest_birth_date(), self.today(), keys::INVALID_DATE),
                )
            });

        let entity = entity?;

        let first_name = match entity {
            EntityKind::Moral => None,
            EntityKind::Physical => {
                let first = record.first_name.as_deref().unwrap_or("");
                self.expect_ok(
                    errors,
                    paths::FIRST_NAME,
                    check(first)
                        .pattern(Pattern::FirstName, keys::INVALID_NAME)
                        .finish(),
                );
                Some(first.to_string()).filter(|s| !s.is_empty())
            }
        };

        let gender = match record.gender {
            None => {
                self.report_kind(errors, paths::GENDER, ErrorKind::FieldRequired, keys::REQUIRED);
                None
            }
            Some(g) if (g == Gender::Company) != entity.is_moral() => {
                self.report_kind(
                    errors,
                    paths::GENDER,
                    ErrorKind::CrossFieldInconsistency,
                    keys::GENDER_ENTITY_MISMATCH,
                );
                None
            }
            Some(g) => Some(g),
        };

        if errors.len() > before {
            return None;
        }
        Some(Personal {
            is_moral: entity.is_moral(),
            first_name,
            last_name: record.last_name.clone(),
            gender: gender?,
            date_of_birth: date_of_birth?,
        })
    }

    fn parse_identity(
        &self,
        record: &Record,
        entity: Option<EntityKind>,
        errors: &mut FieldErrors,
    ) -> Option<Identity> {
        let before = errors.len();
        let draft = &record.document;
        let is_moral = entity.is_some_and(|e| e.is_moral());

        let rules = match draft.doc_type.as_deref().map(|tag| resolve(tag, is_moral)) {
            Some(Ok(rules)) => Some(rules),
            Some(Err(_)) | None => {
                self.report_kind(
                    errors,
                    paths::DOCUMENT_TYPE,
                    ErrorKind::DiscriminantInvalid,
                    keys::TYPE_INVALID,
                );
                None
            }
        };

        let document = rules.and_then(|rules| self.parse_document(record, &rules, entity, errors));
        let nui = self.parse_nui(record, entity.map(|e| NuiPattern::for_entity(e.is_moral())), errors);

        if errors.len() > before {
            return None;
        }
        Some(Identity {
            document: document?,
            nui: nui?,
        })
    }

    fn parse_document(
        &self,
        record: &Record,
        rules: &VariantRules,
        entity: Option<EntityKind>,
        errors: &mut FieldErrors,
    ) -> Option<IdentityDocument> {
        let draft = &record.document;

        if let Some(entity) = entity {
            if rules.document_type.holder() != entity {
                self.report_kind(
                    errors,
                    paths::DOCUMENT_TYPE,
                    ErrorKind::CrossFieldInconsistency,
                    keys::TYPE_ENTITY_MISMATCH,
                );
            }
        }

        let number_ok = self.expect_ok(
            errors,
            paths::DOCUMENT_NUMBER,
            check(&draft.number)
                .required(keys::REQUIRED)
                .chars(rules.number, &rules.number_short_key(), &rules.number_long_key())
                .finish(),
        );

        let postfix = if rules.requires_postfix {
            let post = self.expect_some(
                errors,
                paths::DOCUMENT_POSTFIX_POST,
                present(draft.postfix.post, keys::POSTFIX_POST),
            );
            let code_ok = self.expect_ok(
                errors,
                paths::DOCUMENT_POSTFIX_CODE,
                check(&draft.postfix.code)
                    .required(keys::POSTFIX_CODE)
                    .pattern(Pattern::PostfixCode, keys::POSTFIX_CODE)
                    .finish(),
            );
            match post {
                Some(post) if code_ok => Some(Postfix {
                    post,
                    code: draft.postfix.code.clone(),
                }),
                _ => None,
            }
        } else {
            None
        };

        let validity_date = self.expect_some(
            errors,
            paths::DOCUMENT_VALIDITY_DATE,
            present(draft.validity_date, keys::VALIDITY_DATE_REQUIRED),
        );
        let front_image = self.expect_some(
            errors,
            paths::DOCUMENT_FRONT_IMAGE,
            present(draft.front_image.clone(), keys::FRONT_IMAGE_REQUIRED),
        );
        let back_image = self.expect_some(
            errors,
            paths::DOCUMENT_BACK_IMAGE,
            present(draft.back_image.clone(), keys::BACK_IMAGE_REQUIRED),
        );

        if !number_ok {
            return None;
        }
        let number = draft.number.clone();
        let validity_date = validity_date?;
        let front_image = front_image?;
        let back_image = back_image?;

        let postfixed = |postfix: Postfix| PostfixedDocument {
            number: number.clone(),
            postfix,
            validity_date,
            front_image: front_image.clone(),
            back_image: back_image.clone(),
        };

        let document = match rules.document_type {
            DocumentType::Cni => IdentityDocument::Cni(postfixed(postfix?)),
            DocumentType::Cs => IdentityDocument::Cs(postfixed(postfix?)),
            DocumentType::RecpCs => IdentityDocument::RecpCs(postfixed(postfix?)),
            DocumentType::RecpCni => IdentityDocument::RecpCni(postfixed(postfix?)),
            DocumentType::TradeRegister => IdentityDocument::TradeRegister(RegisterDocument {
                number: number.clone(),
                validity_date,
                front_image: front_image.clone(),
                back_image: back_image.clone(),
            }),
        };
        Some(document)
    }

    fn parse_nui(
        &self,
        record: &Record,
        pattern: Option<NuiPattern>,
        errors: &mut FieldErrors,
    ) -> Option<NuiDocument> {
        let nui = &record.nui_document;
        let mut chain = check(&nui.number)
            .required(keys::NUI_REQUIRED)
            .max_chars(NUI_MAX_CHARS, keys::NUI_LENGTH);
        if let Some(pattern) = pattern {
            let p = match pattern {
                NuiPattern::PatternA => Pattern::NuiPhysical,
                NuiPattern::PatternB => Pattern::NuiMoral,
            };
            chain = chain.pattern(p, pattern.error_key());
        }
        let number_ok = self.expect_ok(errors, paths::NUI_NUMBER, chain.finish());
        let file: Option<FileRef> = self.expect_some(
            errors,
            paths::NUI_FILE,
            present(nui.file.clone(), keys::NUI_FILE_REQUIRED),
        );
        if !number_ok {
            return None;
        }
        Some(NuiDocument {
            number: nui.number.clone(),
            file: file?,
        })
    }

    fn parse_contact(&self, record: &Record, errors: &mut FieldErrors) -> Option<Contact> {
        let before = errors.len();

        if record.phone_numbers.is_empty() {
            self.report_kind(
                errors,
                paths::PHONE_NUMBERS,
                ErrorKind::FieldRequired,
                keys::PHONE_MIN,
            );
        }
        let phones = FieldPath::new(paths::PHONE_NUMBERS);
        for (i, phone) in record.phone_numbers.iter().enumerate() {
            self.expect_ok(
                errors,
                phones.index(i).child("number"),
                check(&phone.number)
                    .required(keys::PHONE_INVALID)
                    .pattern(Pattern::Phone, keys::PHONE_INVALID)
                    .finish(),
            );
        }

        self.expect_ok(
            errors,
            paths::EMAIL,
            check(&record.email)
                .required(keys::REQUIRED)
                .pattern(Pattern::Email, keys::INVALID_EMAIL)
                .finish(),
        );

        if errors.len() > before {
            return None;
        }
        Some(Contact {
            phone_numbers: record.phone_numbers.clone(),
            location: record.location.clone(),
            email: record.email.clone(),
        })
    }

    fn parse_contract(&self, record: &Record, errors: &mut FieldErrors) -> Option<ContractSection> {
        let before = errors.len();
        let draft = &record.contract;

        self.check_contract_number(errors, paths::CONTRACT_NUMBER, &draft.number);
        let status: Option<ContractStatus> = self.expect_some(
            errors,
            paths::CONTRACT_STATUS,
            present(draft.status, keys::REQUIRED),
        );
        let customer_status: Option<CustomerStatus> = self.expect_some(
            errors,
            paths::CONTRACT_CUSTOMER_STATUS,
            present(draft.customer_status, keys::REQUIRED),
        );
        let usage_type: Option<UsageType> = self.expect_some(
            errors,
            paths::CONTRACT_USAGE_TYPE,
            present(draft.usage_type, keys::REQUIRED),
        );

        let meter_details = if draft.has_meter_details {
            self.parse_meter(&draft.meter_details, errors)
        } else {
            if draft.meter_details.has_user_data() {
                self.report_kind(
                    errors,
                    paths::METER_DETAILS,
                    ErrorKind::CrossFieldInconsistency,
                    keys::METER_DETAILS_UNEXPECTED,
                );
            }
            None
        };

        let others = &record.other_contracts;
        let mut other_contracts = Vec::new();
        if others.has_other_contracts {
            let numbers = FieldPath::new(paths::OTHER_CONTRACT_NUMBERS);
            for (i, entry) in others.entries.iter().enumerate() {
                self.check_contract_number(errors, numbers.index(i), &entry.number);
                other_contracts.push(OtherContract {
                    number: entry.number.clone(),
                    usage_type: entry.usage_type,
                    meter_details: entry
                        .meter_details
                        .as_ref()
                        .filter(|m| m.has_user_data())
                        .map(lenient_meter),
                });
            }
        } else if !others.entries.is_empty() {
            self.report_kind(
                errors,
                paths::OTHER_CONTRACTS,
                ErrorKind::CrossFieldInconsistency,
                keys::OTHER_CONTRACTS_UNEXPECTED,
            );
        }

        if errors.len() > before {
            return None;
        }
        Some(ContractSection {
            contract: Contract {
                number: draft.number.clone(),
                status: status?,
                customer_status: customer_status?,
                usage_type: usage_type?,
                activity: non_blank(&draft.activity),
                has_meter_details: draft.has_meter_details,
                meter_details,
            },
            other_contracts,
        })
    }

    /// Synchronous contract-number rules. The existence check is separate.
    pub(crate) fn check_contract_number(
        &self,
        errors: &mut FieldErrors,
        path: impl Into<FieldPath>,
        number: &str,
    ) -> bool {
        self.expect_ok(
            errors,
            path,
            check(number)
                .required(keys::CONTRACT_NUMBER_REQUIRED)
                .pattern(Pattern::ContractNumber, keys::CONTRACT_INVALID)
                .finish(),
        )
    }

    fn parse_meter(&self, meter: &MeterDraft, errors: &mut FieldErrors) -> Option<MeterDetails> {
        let number_ok = self.expect_ok(
            errors,
            paths::METER_NUMBER,
            check(&meter.number).required(keys::REQUIRED).finish(),
        );
        let status: Option<MeterStatus> =
            self.expect_some(errors, paths::METER_STATUS, present(meter.status, keys::REQUIRED));
        let meter_type: Option<MeterType> =
            self.expect_some(errors, paths::METER_TYPE, present(meter.meter_type, keys::REQUIRED));
        if !number_ok {
            return None;
        }
        Some(MeterDetails {
            number: meter.number.clone(),
            status: status?,
            meter_type: meter_type?,
            characteristics: non_blank(&meter.characteristics),
            itinerary_number: non_blank(&meter.itinerary_number),
            transformer_power: non_blank(&meter.transformer_power),
            voltage: non_blank(&meter.voltage),
        })
    }
}

/// Meter details of a secondary contract, where every field is optional.
fn lenient_meter(meter: &MeterDraft) -> MeterDetails {
    MeterDetails {
        number: meter.number.clone(),
        status: meter.status.unwrap_or(MeterStatus::Active),
        meter_type: meter.meter_type.unwrap_or(MeterType::Postpaid),
        characteristics: non_blank(&meter.characteristics),
        itinerary_number: non_blank(&meter.itinerary_number),
        transformer_power: non_blank(&meter.transformer_power),
        voltage: non_blank(&meter.voltage),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

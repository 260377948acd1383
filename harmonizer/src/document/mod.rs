//! Structured study documents and their single-level projection.

mod flatten;
mod model;

pub use flatten::FlattenedDocument;
pub use model::{
    ArmsInterventionsModule, ConditionBrowseModule, ConditionsModule, DateStruct,
    DerivedSection, DescriptionModule, DesignModule, DocumentSection, EligibilityModule,
    EnrollmentInfo, IdentificationModule, Intervention, LargeDocument, LargeDocumentModule,
    MeshTerm, Organization, ProtocolSection, SponsorCollaboratorsModule, StatusModule,
    StudyDocument,
};

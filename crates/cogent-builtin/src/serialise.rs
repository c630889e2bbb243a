use cogent_app::{AppDescriptor, AppError, Outcome};
use serde_json::Value;

pub(crate) fn apps() -> Result<Vec<AppDescriptor>, AppError> {
  Ok(vec![to_json()?])
}

fn to_json() -> Result<AppDescriptor, AppError> {
  AppDescriptor::builder("serialise.to_json")
    .input("SeqsCollectionType | DistanceMatrix | Tree")
    .output("SerialisableType")
    .description("serialise the input to a JSON string")
    .function(|value: Value| {
      Ok(Outcome::Completed(Value::String(serde_json::to_string(&value)?)))
    })
    .build()
}

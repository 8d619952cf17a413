use thrift::protocol::{TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol, TType};
use thrift::{ApplicationError, ApplicationErrorKind};

use crate::hive::tcli::{
    read_struct, write_field, write_struct, ReadThrift, TCloseSessionReq, TExecuteStatementReq,
    TExecuteStatementResp, TFetchResultsReq, TFetchResultsResp, TGetOperationStatusResp,
    TGetResultSetMetadataResp, TOpenSessionReq, TOpenSessionResp, TOperationHandle,
    TOperationReq, TStatusResp, WriteThrift, FETCH_ORIENTATION_NEXT,
};

/// A blocking `TCLIService` client.
///
/// Calls are strictly sequential, so a reply always belongs to the last call.
pub(crate) struct TcliClient {
    i_prot: Box<dyn TInputProtocol>,
    o_prot: Box<dyn TOutputProtocol>,
    sequence_number: i32,
}

impl TcliClient {
    pub fn new(
        i_prot: impl TInputProtocol + 'static,
        o_prot: impl TOutputProtocol + 'static,
    ) -> Self {
        Self {
            i_prot: Box::new(i_prot),
            o_prot: Box::new(o_prot),
            sequence_number: 0,
        }
    }

    pub fn open_session(&mut self, request: &TOpenSessionReq) -> thrift::Result<TOpenSessionResp> {
        self.call("OpenSession", request)
    }

    pub fn close_session(&mut self, request: &TCloseSessionReq) -> thrift::Result<TStatusResp> {
        self.call("CloseSession", request)
    }

    pub fn execute_statement(
        &mut self,
        request: &TExecuteStatementReq,
    ) -> thrift::Result<TExecuteStatementResp> {
        self.call("ExecuteStatement", request)
    }

    pub fn get_operation_status(
        &mut self,
        handle: &TOperationHandle,
    ) -> thrift::Result<TGetOperationStatusResp> {
        let request = TOperationReq {
            name: "TGetOperationStatusReq",
            operation_handle: handle,
        };
        self.call("GetOperationStatus", &request)
    }

    pub fn get_result_set_metadata(
        &mut self,
        handle: &TOperationHandle,
    ) -> thrift::Result<TGetResultSetMetadataResp> {
        let request = TOperationReq {
            name: "TGetResultSetMetadataReq",
            operation_handle: handle,
        };
        self.call("GetResultSetMetadata", &request)
    }

    pub fn fetch_results(
        &mut self,
        handle: &TOperationHandle,
        max_rows: i64,
    ) -> thrift::Result<TFetchResultsResp> {
        let request = TFetchResultsReq {
            operation_handle: handle,
            orientation: FETCH_ORIENTATION_NEXT,
            max_rows,
        };
        self.call("FetchResults", &request)
    }

    pub fn close_operation(&mut self, handle: &TOperationHandle) -> thrift::Result<TStatusResp> {
        let request = TOperationReq {
            name: "TCloseOperationReq",
            operation_handle: handle,
        };
        self.call("CloseOperation", &request)
    }

    fn call<Req, Resp>(&mut self, method: &str, request: &Req) -> thrift::Result<Resp>
    where
        Req: WriteThrift,
        Resp: ReadThrift,
    {
        self.sequence_number = self.sequence_number.wrapping_add(1);
        let sequence_number = self.sequence_number;

        let o = self.o_prot.as_mut();
        o.write_message_begin(&TMessageIdentifier::new(
            method,
            TMessageType::Call,
            sequence_number,
        ))?;
        write_struct(o, &format!("{method}_args"), |o| {
            write_field(o, "req", TType::Struct, 1, |o| request.write(o))
        })?;
        o.write_message_end()?;
        o.flush()?;

        let i = self.i_prot.as_mut();
        let message = i.read_message_begin()?;
        if message.message_type == TMessageType::Exception {
            let error = thrift::Error::read_application_error_from_in_protocol(i)?;
            i.read_message_end()?;
            return Err(thrift::Error::Application(error));
        }
        if message.message_type != TMessageType::Reply {
            return Err(application_error(
                ApplicationErrorKind::InvalidMessageType,
                format!("{method} received a {:?} message", message.message_type),
            ));
        }
        if message.name != method {
            return Err(application_error(
                ApplicationErrorKind::WrongMethodName,
                format!("{method} received a reply for {}", message.name),
            ));
        }
        if message.sequence_number != sequence_number {
            return Err(application_error(
                ApplicationErrorKind::BadSequenceId,
                format!(
                    "{method} expected sequence number {sequence_number} but received {}",
                    message.sequence_number
                ),
            ));
        }
        let mut response = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (0, TType::Struct) => response = Some(Resp::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        i.read_message_end()?;
        response.ok_or_else(|| {
            application_error(
                ApplicationErrorKind::MissingResult,
                format!("{method} returned no result"),
            )
        })
    }
}

fn application_error(kind: ApplicationErrorKind, message: String) -> thrift::Error {
    thrift::Error::Application(ApplicationError::new(kind, message))
}
